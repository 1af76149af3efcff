//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Database and backend readiness
//!
//! # Menu
//! GET  /products               - Menu with category tabs (?category=)
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit
//! POST /cart/update            - Change quantity
//! POST /cart/remove            - Remove line
//! POST /checkout               - Place order
//!
//! # Account (requires auth)
//! GET  /orders                 - Order history
//! GET  /profile                - Profile setup
//! POST /profile                - Save profile
//!
//! # Admin (requires admin)
//! GET  /admin                  - Orders by total, catalog, roles
//! POST /admin/orders/status    - Update order status
//! POST /admin/food             - Add food item
//! POST /admin/food/delete      - Delete food item
//! POST /admin/food/availability - Mark available / sold out
//! POST /admin/roles            - Assign user role
//!
//! # Auth
//! GET  /auth/login             - Redirect to identity provider
//! GET  /auth/callback          - Provider callback
//! POST /auth/logout            - Logout
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod orders;
pub mod products;
pub mod profile;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::db;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/orders/status", post(admin::update_order_status))
        .route("/food", post(admin::add_food_item))
        .route("/food/delete", post(admin::delete_food_item))
        .route("/food/availability", post(admin::set_availability))
        .route("/roles", post(admin::assign_role))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .route("/orders", get(orders::index))
        .route("/profile", get(profile::show).post(profile::save))
        .nest("/admin", admin_routes())
        .nest("/auth", auth_routes())
}

async fn health() -> &'static str {
    "ok"
}

/// Ready once the session database answers and the backend has been reached.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if db::ping(state.pool()).await && state.connector().is_connected() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use askama::Template;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use sqlx::PgPool;
    use tower::ServiceExt;
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

    use foodhub_core::{CartItem, Category, FoodId, FoodItem, Price, Principal};

    use super::cart::{CartTemplate, CartView};
    use crate::actor::fake::FakeActor;
    use crate::config::tests::test_config;
    use crate::gate::Gated;
    use crate::identity::{Identity, LoginStatus};
    use crate::middleware::set_identity;
    use crate::seed::{SEED_ITEMS, SeedItem};
    use crate::shell::{LoginButton, Shell};
    use crate::state::AppState;

    async fn app(fake: &FakeActor) -> Router {
        app_with_store(fake, MemoryStore::default()).await
    }

    async fn app_with_store(fake: &FakeActor, store: MemoryStore) -> Router {
        let pool = PgPool::connect_lazy("postgres://localhost/foodhub_test").unwrap();
        let state = AppState::with_transport(test_config(), pool, fake.transport());
        state.connector().connect().await.unwrap();
        crate::app(state, SessionManagerLayer::new(store))
    }

    /// Store a signed-in session and return its cookie header.
    async fn signed_in(store: &MemoryStore, identity: &Identity) -> String {
        let session = Session::new(None, Arc::new(store.clone()), None);
        set_identity(&session, identity).await.unwrap();
        session.save().await.unwrap();
        format!("id={}", session.id().unwrap())
    }

    async fn post_form(app: Router, uri: &str, cookie: &str, body: &'static str) -> StatusCode {
        app.oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    const ADMIN_FORMS: [(&str, &str); 5] = [
        ("/admin/orders/status", "order_id=1&status=delivered"),
        (
            "/admin/food",
            "name=Samosa&description=Crisp&price=40&prep_time=10&image_url=&category=snacks",
        ),
        ("/admin/food/delete", "food_id=1"),
        ("/admin/food/availability", "food_id=1&available=false"),
        ("/admin/roles", "principal=guest-2&role=admin"),
    ];

    const ADMIN_MUTATIONS: [&str; 5] = [
        "updateOrderStatus",
        "addFoodItem",
        "deleteFoodItem",
        "updateFoodItem",
        "assignCallerUserRole",
    ];

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn signed_out_shell() -> Shell {
        Shell {
            authenticated: false,
            is_admin: false,
            connected: true,
            cart_count: 0,
            login: LoginButton::new(LoginStatus::Idle, false, None),
            needs_profile: false,
            flash: None,
        }
    }

    #[tokio::test]
    async fn test_gated_pages_prompt_for_login() {
        let fake = FakeActor::new();
        for uri in ["/cart", "/orders", "/profile", "/admin"] {
            let (status, body) = get(app(&fake).await, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body.contains("Please sign in"), "{uri}");
        }
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_menu_filters_by_category() {
        let fake = FakeActor::new();
        fake.insert_items(SEED_ITEMS.iter().map(SeedItem::to_food_item));

        let (status, body) = get(app(&fake).await, "/products?category=breakfast").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Aloo Paratha"));
        assert!(!body.contains("Chicken Biryani"));
        assert_eq!(body.matches("tab tab-active").count(), 1);
        assert_eq!(fake.calls("getAllFoodItems"), 1);
        assert_eq!(fake.calls("getFoodItemsByCategory"), 0);

        let (_, body) = get(app(&fake).await, "/products?category=dessert").await;
        for seed in &SEED_ITEMS {
            assert!(body.contains(seed.name), "{}", seed.name);
        }
    }

    #[tokio::test]
    async fn test_empty_category_message() {
        let fake = FakeActor::new();
        let (_, body) = get(app(&fake).await, "/products?category=snacks").await;
        assert!(body.contains("No items found in this category"));
    }

    #[tokio::test]
    async fn test_anonymous_add_to_cart_is_not_sent() {
        let fake = FakeActor::new();
        let response = app(&fake)
            .await
            .oneshot(
                Request::post("/cart/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("food_id=1"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");
        assert_eq!(fake.calls("addToCart"), 0);
    }

    #[tokio::test]
    async fn test_admin_actions_refused_for_customers() {
        let fake = FakeActor::new();
        fake.insert_items(SEED_ITEMS.iter().map(SeedItem::to_food_item));
        let store = MemoryStore::default();
        let cookie = signed_in(&store, &Identity::new(Principal::new("customer-1"), "token")).await;

        for (uri, body) in ADMIN_FORMS {
            let status = post_form(app_with_store(&fake, store.clone()).await, uri, &cookie, body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        }

        let response = app_with_store(&fake, store.clone())
            .await
            .oneshot(
                Request::get("/admin")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        for method in ADMIN_MUTATIONS {
            assert_eq!(fake.calls(method), 0, "{method}");
        }
        assert_eq!(fake.items().len(), SEED_ITEMS.len());
    }

    #[tokio::test]
    async fn test_admin_delete_reaches_backend() {
        let fake = FakeActor::new();
        fake.insert_items(SEED_ITEMS.iter().map(SeedItem::to_food_item));
        let admin = Identity::new(Principal::new("admin-1"), "token");
        fake.make_admin(admin.principal());
        let store = MemoryStore::default();
        let cookie = signed_in(&store, &admin).await;

        let status = post_form(
            app_with_store(&fake, store).await,
            "/admin/food/delete",
            &cookie,
            "food_id=1",
        )
        .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(fake.calls("deleteFoodItem"), 1);
    }

    #[tokio::test]
    async fn test_health_and_security_headers() {
        let fake = FakeActor::new();
        let (status, body) = get(app(&fake).await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let response = app(&fake)
            .await
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let csp = response.headers()[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap();
        assert!(csp.contains("form-action 'self' https://identity.test"));
    }

    #[test]
    fn test_cart_template_renders_gate_states() {
        let prompt = CartTemplate {
            shell: signed_out_shell(),
            page: Gated::LoginPrompt,
        }
        .render()
        .unwrap();
        assert!(prompt.contains("Please sign in"));
        assert!(!prompt.contains("Place Order"));

        let item = FoodItem {
            id: FoodId::new(1),
            name: "Chicken Biryani".to_string(),
            description: String::new(),
            price: Price::from_units(180),
            prep_time: 30,
            is_available: true,
            image_url: String::new(),
            categories: vec![Category::Lunch],
        };
        let lines = vec![CartItem {
            food_item: item,
            quantity: 2,
        }];
        let content = CartTemplate {
            shell: signed_out_shell(),
            page: Gated::Content(CartView::new(&lines, None)),
        }
        .render()
        .unwrap();
        assert!(content.contains("Items (1)"));
        assert!(content.contains("$360.00"));
        assert!(content.contains("Place Order"));
        assert!(!content.contains("Please sign in"));
    }
}
