use serde::Deserialize;

use crate::validation::FormFields;

/// Body of `POST /register`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl FormFields for RegisterForm {
    fn value(&self, name: &str) -> &str {
        match name {
            "name" => &self.name,
            "username" => &self.username,
            "email" => &self.email,
            "password" => &self.password,
            "confirm" => &self.confirm,
            _ => "",
        }
    }
}

/// Body of `POST /login`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
