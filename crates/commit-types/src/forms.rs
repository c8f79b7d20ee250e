//! HTML form payloads. Numeric and date inputs arrive as strings (browsers
//! submit empty fields as "") and are validated in the handlers.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCommitmentForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub starts_on: String,
    #[serde(default)]
    pub ends_on: String,
}

#[derive(Debug, Deserialize)]
pub struct NewRequirementForm {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub count: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPostForm {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub image_url: String,
}
