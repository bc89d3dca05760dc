use maud::{html, Markup};

use super::{field_errors, layout, Chrome};
use crate::articles::repo_types::Article;
use crate::validation::ValidationErrors;

fn article_table(articles: &[Article], with_actions: bool) -> Markup {
    html! {
        table {
            tr {
                th { "#" }
                th { "Title" }
                th { "Author" }
                @if with_actions {
                    th {}
                    th {}
                }
            }
            @for a in articles {
                tr {
                    td { (a.id) }
                    td { a href={ "/article/" (a.id) } { (a.title) } }
                    td { (a.author) }
                    @if with_actions {
                        td { a href={ "/edit/" (a.id) } { "Edit" } }
                        td { a href={ "/delete/" (a.id) } { "Delete" } }
                    }
                }
            }
        }
    }
}

pub fn article_list(chrome: &Chrome, articles: &[Article]) -> Markup {
    let body = html! {
        h1 { "Articles" }
        @if articles.is_empty() {
            div.alert.alert-warning { "There are no articles yet." }
        } @else {
            (article_table(articles, false))
        }
    };
    layout("Articles", chrome, body)
}

pub fn dashboard(chrome: &Chrome, articles: &[Article]) -> Markup {
    let body = html! {
        h1 { "Dashboard" }
        p { a href="/addarticle" { "Add article" } }
        @if articles.is_empty() {
            div.alert.alert-warning { "You have not written any articles yet." }
        } @else {
            (article_table(articles, true))
        }
    };
    layout("Dashboard", chrome, body)
}

pub fn article_detail(chrome: &Chrome, article: Option<&Article>) -> Markup {
    let body = html! {
        @match article {
            Some(a) => {
                h1 { (a.title) }
                p { small { "by " (a.author) } }
                div.content {
                    @for (i, line) in a.content.lines().enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
            None => {
                div.alert.alert-warning { "There is no such article." }
            }
        }
    };
    layout("Article", chrome, body)
}

/// Values shown in the add/edit article form.
#[derive(Debug)]
pub struct ArticleFormView<'a> {
    pub heading: &'a str,
    pub action: String,
    pub title: &'a str,
    pub content: &'a str,
    pub errors: ValidationErrors,
}

pub fn article_form(chrome: &Chrome, form: &ArticleFormView<'_>) -> Markup {
    let body = html! {
        h1 { (form.heading) }
        form method="POST" action=(form.action) {
            label { "Title" input type="text" name="title" value=(form.title); }
            (field_errors(&form.errors, "title"))
            label { "Content" textarea name="content" rows="10" { (form.content) } }
            (field_errors(&form.errors, "content"))
            p { button type="submit" { "Save" } }
        }
    };
    layout(form.heading, chrome, body)
}
