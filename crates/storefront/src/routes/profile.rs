//! Profile setup.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use foodhub_core::UserProfile;

use crate::filters;
use crate::gate::Gated;
use crate::middleware::{RequireAuth, push_flash};
use crate::models::Flash;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

#[derive(Clone)]
pub struct ProfileView {
    pub name: String,
    pub role: String,
    pub principal: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub shell: Shell,
    pub page: Gated<ProfileView>,
}

#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let shell = Shell::load(&state, &visitor).await;
    let visitor = &visitor;

    let page = Gated::load(visitor.identity.as_ref(), |identity| async move {
        let queries = visitor.queries();
        let profile = queries.current_user_profile(visitor.actor()).await;
        let role = queries.user_role(visitor.actor()).await;
        ProfileView {
            name: profile.data.map(|p| p.name).unwrap_or_default(),
            role: role.data.to_string(),
            principal: identity.principal().to_string(),
        }
    })
    .await;

    ProfileTemplate { shell, page }
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
}

/// Save the caller's display name.
#[instrument(skip(visitor))]
pub async fn save(
    RequireAuth(_): RequireAuth,
    visitor: Visitor,
    Form(form): Form<ProfileForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        push_flash(&visitor.session, Flash::error("Please enter your name")).await;
        return Redirect::to("/profile").into_response();
    }

    let profile = UserProfile {
        name: name.to_string(),
    };
    match visitor.queries().save_profile(visitor.actor(), profile).await {
        Ok(()) => {
            push_flash(&visitor.session, Flash::success("Profile saved")).await;
            Redirect::to("/").into_response()
        }
        Err(e) => {
            push_flash(
                &visitor.session,
                Flash::error(e.user_message("Failed to save profile")),
            )
            .await;
            Redirect::to("/profile").into_response()
        }
    }
}
