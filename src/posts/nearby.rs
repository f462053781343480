use axum::{async_trait, extract::FromRequestParts, extract::Query, http::request::Parts};
use serde::Deserialize;

use super::repo;
use super::repo_types::PostListing;
use crate::error::AppError;
use crate::geo::Coordinates;
use crate::state::AppState;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Query string as sent by clients; everything arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct RawNearbyQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius_km: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl TryFrom<RawNearbyQuery> for NearbySearch {
    type Error = AppError;

    fn try_from(raw: RawNearbyQuery) -> Result<Self, Self::Error> {
        let invalid = || AppError::validation("Invalid location or radius parameters.");
        let lat = parse_number(raw.lat.as_deref()).ok_or_else(invalid)?;
        let lon = parse_number(raw.lon.as_deref()).ok_or_else(invalid)?;
        let radius_km = match raw.radius_km.as_deref() {
            None => DEFAULT_RADIUS_KM,
            some => parse_number(some).ok_or_else(invalid)?,
        };
        Ok(Self {
            lat,
            lon,
            radius_km,
        })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for NearbySearch {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawNearbyQuery>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::validation("Invalid location or radius parameters."))?;
        NearbySearch::try_from(raw)
    }
}

/// Keep visible posts whose distance from the search point is within the
/// radius, boundary included. Input order is preserved.
pub fn select_nearby(listings: Vec<PostListing>, search: &NearbySearch) -> Vec<PostListing> {
    let origin = Coordinates {
        lat: search.lat,
        lon: search.lon,
    };
    listings
        .into_iter()
        .filter(|l| l.post.is_visible())
        .filter(|l| origin.distance_km(&l.post.location) <= search.radius_km)
        .collect()
}

pub async fn find_nearby(st: &AppState, search: &NearbySearch) -> Result<Vec<PostListing>, AppError> {
    let listings = repo::scan_visible(&st.db)
        .await?
        .into_iter()
        .map(PostListing::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(select_nearby(listings, search))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::geo::haversine_km;
    use crate::posts::repo_types::fixtures::{listing, post};
    use crate::posts::repo_types::{ApprovalStatus, ClaimStatus};

    fn raw(lat: Option<&str>, lon: Option<&str>, radius: Option<&str>) -> RawNearbyQuery {
        RawNearbyQuery {
            lat: lat.map(Into::into),
            lon: lon.map(Into::into),
            radius_km: radius.map(Into::into),
        }
    }

    #[test]
    fn radius_defaults_to_five_km() {
        let s = NearbySearch::try_from(raw(Some("12.97"), Some("77.60"), None)).unwrap();
        assert_eq!(s.radius_km, DEFAULT_RADIUS_KM);
        assert_eq!((s.lat, s.lon), (12.97, 77.60));
    }

    #[test]
    fn malformed_parameters_are_validation_errors() {
        let cases = [
            raw(None, Some("77.6"), None),
            raw(Some("12.9"), None, None),
            raw(Some("north"), Some("77.6"), None),
            raw(Some("12.9"), Some("77.6"), Some("far")),
            raw(Some("NaN"), Some("77.6"), None),
            raw(Some("12.9"), Some("77.6"), Some("inf")),
        ];
        for case in cases {
            assert!(matches!(
                NearbySearch::try_from(case),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn extractor_rejects_bad_query_strings() {
        for uri in [
            "/nearby_posts?lon=77.6",
            "/nearby_posts?lat=abc&lon=77.6",
            "/nearby_posts?lat=12.9&lon=77.6&radius_km=wide",
        ] {
            let req = axum::http::Request::get(uri).body(()).unwrap();
            let (mut parts, _) = req.into_parts();
            let err = NearbySearch::from_request_parts(&mut parts, &()).await.unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref m) if m == "Invalid location or radius parameters."),
                "{uri}"
            );
        }

        let req = axum::http::Request::get("/nearby_posts?lat=12.97&lon=77.6").body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let search = NearbySearch::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(search.radius_km, DEFAULT_RADIUS_KM);
    }

    #[test]
    fn bangalore_scenario_respects_radius() {
        let p = listing(post(Uuid::new_v4(), 12.97, 77.59));
        let wide = NearbySearch { lat: 12.97, lon: 77.60, radius_km: 5.0 };
        let narrow = NearbySearch { radius_km: 0.5, ..wide };
        assert_eq!(select_nearby(vec![p.clone()], &wide).len(), 1);
        assert!(select_nearby(vec![p], &narrow).is_empty());
    }

    #[test]
    fn boundary_is_inclusive() {
        let p = listing(post(Uuid::new_v4(), 12.97, 77.59));
        let d = haversine_km(12.97, 77.60, 12.97, 77.59);
        let exact = NearbySearch { lat: 12.97, lon: 77.60, radius_km: d };
        assert_eq!(select_nearby(vec![p], &exact).len(), 1);
    }

    #[test]
    fn hidden_posts_never_match_even_at_zero_distance() {
        let owner = Uuid::new_v4();
        let mut pending = post(owner, 10.0, 10.0);
        pending.approval_status = ApprovalStatus::Pending;
        let mut declined = post(owner, 10.0, 10.0);
        declined.approval_status = ApprovalStatus::Declined;
        let mut claimed = post(owner, 10.0, 10.0);
        claimed.status = ClaimStatus::Claimed;
        let visible = post(owner, 10.0, 10.0);

        let search = NearbySearch { lat: 10.0, lon: 10.0, radius_km: 100.0 };
        let found = select_nearby(
            vec![listing(pending), listing(declined), listing(claimed), listing(visible.clone())],
            &search,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].post.id, visible.id);
    }

    #[test]
    fn storage_order_is_preserved() {
        let owner = Uuid::new_v4();
        let far = post(owner, 12.99, 77.59);
        let near = post(owner, 12.97, 77.60);
        let out_of_range = post(owner, 40.0, -70.0);
        let search = NearbySearch { lat: 12.97, lon: 77.60, radius_km: 10.0 };
        let ids: Vec<_> = select_nearby(
            vec![listing(far.clone()), listing(out_of_range), listing(near.clone())],
            &search,
        )
        .into_iter()
        .map(|l| l.post.id)
        .collect();
        assert_eq!(ids, vec![far.id, near.id]);
    }
}
