use axum::extract::Multipart;
use lazy_static::lazy_static;
use regex::Regex;

use super::repo_types::PostFields;
use crate::error::AppError;
use crate::geo::Coordinates;
use crate::images::ImageUpload;

fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9(][0-9 ()\-]{4,18}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Multipart body of the create/edit post forms.
#[derive(Debug, Default)]
pub struct PostForm {
    pub food_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub image: Option<ImageUpload>,
}

impl PostForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();
        while let Some(field) = mp
            .next_field()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(e.body_text()))?;
                // Browsers send an empty part when no file was picked.
                if !data.is_empty() {
                    form.image = Some(ImageUpload::new(data, content_type)?);
                }
                continue;
            }
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            form.set(&name, text);
        }
        Ok(form)
    }

    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "food_name" => &mut self.food_name,
            "description" => &mut self.description,
            "quantity" => &mut self.quantity,
            "phone_number" => &mut self.phone_number,
            "city" => &mut self.city,
            "lat" => &mut self.lat,
            "lon" => &mut self.lon,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validate the text fields. The image, if any, is handed back untouched.
    pub fn into_fields(self) -> Result<(PostFields, Option<ImageUpload>), AppError> {
        let food_name = required(self.food_name, "food_name", Some(100))?;
        let description = required(self.description, "description", None)?;
        let quantity = required(self.quantity, "quantity", Some(50))?;
        let phone_number = required(self.phone_number, "phone_number", Some(20))?;
        let city = required(self.city, "city", Some(100))?;

        if !is_valid_phone(&phone_number) {
            return Err(AppError::validation("Invalid phone number"));
        }

        let lat = coordinate(self.lat, "lat")?;
        let lon = coordinate(self.lon, "lon")?;
        let location = Coordinates::new(lat, lon)?;

        Ok((
            PostFields {
                food_name,
                description,
                quantity,
                phone_number,
                city,
                location,
            },
            self.image,
        ))
    }
}

fn required(value: Option<String>, name: &str, max_chars: Option<usize>) -> Result<String, AppError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} is required", name)));
    }
    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(AppError::validation(format!(
                "{} must be at most {} characters",
                name, max
            )));
        }
    }
    Ok(value)
}

fn coordinate(value: Option<String>, name: &str) -> Result<f64, AppError> {
    let value = required(value, name, None)?;
    value
        .parse::<f64>()
        .map_err(|_| AppError::validation(format!("{} must be a number", name)))
}
