use maud::{html, Markup};

use super::{field_errors, layout, Chrome};
use crate::validation::ValidationErrors;

/// Values echoed back into the registration form. Passwords are never echoed.
#[derive(Debug, Default)]
pub struct RegisterFormView<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub errors: ValidationErrors,
}

pub fn register_form(chrome: &Chrome, form: &RegisterFormView<'_>) -> Markup {
    let body = html! {
        h1 { "Register" }
        form method="POST" action="/register" {
            label { "Name and last name" input type="text" name="name" value=(form.name); }
            (field_errors(&form.errors, "name"))
            label { "Username" input type="text" name="username" value=(form.username); }
            (field_errors(&form.errors, "username"))
            label { "Email" input type="email" name="email" value=(form.email); }
            (field_errors(&form.errors, "email"))
            label { "Password" input type="password" name="password"; }
            (field_errors(&form.errors, "password"))
            label { "Confirm password" input type="password" name="confirm"; }
            (field_errors(&form.errors, "confirm"))
            p { button type="submit" { "Register" } }
        }
    };
    layout("Register", chrome, body)
}

pub fn login_form(chrome: &Chrome) -> Markup {
    layout(
        "Login",
        chrome,
        html! {
            h1 { "Login" }
            form method="POST" action="/login" {
                label { "Username" input type="text" name="username" autocomplete="username"; }
                label {
                    "Password"
                    input type="password" name="password" autocomplete="current-password";
                }
                p { button type="submit" { "Login" } }
            }
            p { "No account? " a href="/register" { "Register" } }
        },
    )
}
