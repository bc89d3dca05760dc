use maud::{html, Markup};

use super::{layout, Chrome};

pub fn home(chrome: &Chrome) -> Markup {
    layout(
        "Home",
        chrome,
        html! {
            h1 { "Welcome" }
            p { "Read what others have written, or log in to publish your own short articles." }
            p { a href="/articles" { "Browse all articles" } }
        },
    )
}

pub fn about(chrome: &Chrome) -> Markup {
    layout(
        "About",
        chrome,
        html! {
            h1 { "About" }
            p {
                "A small publishing site. Registered users can write, edit and delete their own "
                "articles; everyone can read and search them."
            }
        },
    )
}
