//! In-memory actor used by tests.
//!
//! Keeps a small backend model (catalog, carts, orders, profiles, roles),
//! counts calls per method, can be told to fail specific methods and can hold
//! every call at a gate until the test releases it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use foodhub_core::{
    CartItem, Category, FoodId, FoodItem, OrderId, OrderRecord, OrderStatus, Price, Principal,
    UserProfile, UserRole,
};

use super::{ActorError, ActorTransport, FoodActor};
use crate::identity::Identity;

#[derive(Default)]
struct Backend {
    next_food_id: u64,
    next_order_id: u64,
    items: Vec<FoodItem>,
    carts: HashMap<Principal, Vec<(FoodId, u64)>>,
    orders: Vec<OrderRecord>,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
}

struct FakeState {
    reachable: AtomicBool,
    backend: Mutex<Backend>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Test double for the remote actor.
#[derive(Clone)]
pub(crate) struct FakeActor {
    state: Arc<FakeState>,
}

impl FakeActor {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(FakeState {
                reachable: AtomicBool::new(true),
                backend: Mutex::new(Backend {
                    next_food_id: 1,
                    next_order_id: 1,
                    ..Backend::default()
                }),
                calls: Mutex::new(HashMap::new()),
                failing: Mutex::new(HashSet::new()),
                gate: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn transport(&self) -> Arc<dyn ActorTransport> {
        Arc::new(self.clone())
    }

    /// Handle bound to `caller` without going through a connector.
    pub(crate) fn handle(&self, caller: Option<&Identity>) -> Arc<dyn FoodActor> {
        self.bind(caller)
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::Release);
    }

    /// Number of calls made to `method` (camelCase wire name).
    pub(crate) fn calls(&self, method: &str) -> usize {
        lock(&self.state.calls).get(method).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        lock(&self.state.calls).values().sum()
    }

    /// Make every call to `method` fail with a rejection.
    pub(crate) fn fail(&self, method: &'static str) {
        lock(&self.state.failing).insert(method);
    }

    pub(crate) fn recover(&self, method: &'static str) {
        lock(&self.state.failing).remove(method);
    }

    /// Block every subsequent call until [`Self::release`] hands out permits.
    pub(crate) fn hold(&self) {
        *lock(&self.state.gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held calls through.
    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = lock(&self.state.gate).as_ref() {
            gate.add_permits(n);
        }
    }

    /// Remove the gate and let everything through.
    pub(crate) fn open(&self) {
        if let Some(gate) = lock(&self.state.gate).take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub(crate) fn make_admin(&self, principal: &Principal) {
        lock(&self.state.backend)
            .roles
            .insert(principal.clone(), UserRole::Admin);
    }

    /// Insert catalog items directly, assigning ids.
    pub(crate) fn insert_items(&self, items: impl IntoIterator<Item = FoodItem>) {
        let mut backend = lock(&self.state.backend);
        for mut item in items {
            item.id = FoodId::new(backend.next_food_id);
            backend.next_food_id += 1;
            backend.items.push(item);
        }
    }

    pub(crate) fn items(&self) -> Vec<FoodItem> {
        lock(&self.state.backend).items.clone()
    }
}

#[async_trait]
impl ActorTransport for FakeActor {
    async fn probe(&self) -> Result<(), ActorError> {
        if self.state.reachable.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ActorError::Status {
                status: 503,
                body: String::new(),
            })
        }
    }

    fn bind(&self, caller: Option<&Identity>) -> Arc<dyn FoodActor> {
        Arc::new(FakeHandle {
            state: Arc::clone(&self.state),
            caller: caller.map(|identity| identity.principal().clone()),
        })
    }
}

struct FakeHandle {
    state: Arc<FakeState>,
    caller: Option<Principal>,
}

impl FakeHandle {
    /// Record the call, wait at the gate and apply failure injection.
    async fn enter(&self, method: &'static str) -> Result<(), ActorError> {
        *lock(&self.state.calls).entry(method).or_insert(0) += 1;

        let gate = lock(&self.state.gate).clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| ActorError::Unavailable)?
                .forget();
        }

        if lock(&self.state.failing).contains(method) {
            return Err(ActorError::Rejected(format!("{method} failed")));
        }
        Ok(())
    }

    fn caller(&self) -> Result<&Principal, ActorError> {
        self.caller
            .as_ref()
            .ok_or_else(|| ActorError::Rejected("Unauthorized: anonymous caller".to_string()))
    }

    fn require_admin(&self, backend: &Backend) -> Result<(), ActorError> {
        let caller = self.caller()?;
        if backend.roles.get(caller) == Some(&UserRole::Admin) {
            Ok(())
        } else {
            Err(ActorError::Rejected(
                "Unauthorized: Only admins can perform this action".to_string(),
            ))
        }
    }

    fn cart_items(backend: &Backend, caller: &Principal) -> Vec<CartItem> {
        backend
            .carts
            .get(caller)
            .into_iter()
            .flatten()
            .filter_map(|(id, quantity)| {
                backend
                    .items
                    .iter()
                    .find(|item| item.id == *id)
                    .map(|item| CartItem {
                        food_item: item.clone(),
                        quantity: *quantity,
                    })
            })
            .collect()
    }
}

#[async_trait]
impl FoodActor for FakeHandle {
    async fn add_food_item(&self, mut item: FoodItem) -> Result<FoodId, ActorError> {
        self.enter("addFoodItem").await?;
        let mut backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        let id = FoodId::new(backend.next_food_id);
        backend.next_food_id += 1;
        item.id = id;
        backend.items.push(item);
        Ok(id)
    }

    async fn update_food_item(&self, item: FoodItem) -> Result<(), ActorError> {
        self.enter("updateFoodItem").await?;
        let mut backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        let slot = backend
            .items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or_else(|| ActorError::Rejected("Food item not found".to_string()))?;
        *slot = item;
        Ok(())
    }

    async fn delete_food_item(&self, id: FoodId) -> Result<(), ActorError> {
        self.enter("deleteFoodItem").await?;
        let mut backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        backend.items.retain(|item| item.id != id);
        Ok(())
    }

    async fn get_all_food_items(&self) -> Result<Vec<FoodItem>, ActorError> {
        self.enter("getAllFoodItems").await?;
        Ok(lock(&self.state.backend).items.clone())
    }

    async fn get_food_items_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<FoodItem>, ActorError> {
        self.enter("getFoodItemsByCategory").await?;
        Ok(lock(&self.state.backend)
            .items
            .iter()
            .filter(|item| item.has_category(category))
            .cloned()
            .collect())
    }

    async fn get_cart(&self) -> Result<Vec<CartItem>, ActorError> {
        self.enter("getCart").await?;
        let caller = self.caller()?;
        Ok(Self::cart_items(&lock(&self.state.backend), caller))
    }

    async fn add_to_cart(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError> {
        self.enter("addToCart").await?;
        let caller = self.caller()?.clone();
        let mut backend = lock(&self.state.backend);
        if !backend.items.iter().any(|item| item.id == food_id) {
            return Err(ActorError::Rejected("Food item not found".to_string()));
        }
        let cart = backend.carts.entry(caller).or_default();
        match cart.iter_mut().find(|(id, _)| *id == food_id) {
            Some((_, existing)) => *existing += quantity,
            None => cart.push((food_id, quantity)),
        }
        Ok(())
    }

    async fn update_cart_item(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError> {
        self.enter("updateCartItem").await?;
        let caller = self.caller()?.clone();
        let mut backend = lock(&self.state.backend);
        let cart = backend.carts.entry(caller).or_default();
        match cart.iter_mut().find(|(id, _)| *id == food_id) {
            Some((_, existing)) => {
                *existing = quantity;
                Ok(())
            }
            None => Err(ActorError::Rejected("Item not in cart".to_string())),
        }
    }

    async fn remove_from_cart(&self, food_id: FoodId) -> Result<(), ActorError> {
        self.enter("removeFromCart").await?;
        let caller = self.caller()?.clone();
        let mut backend = lock(&self.state.backend);
        backend
            .carts
            .entry(caller)
            .or_default()
            .retain(|(id, _)| *id != food_id);
        Ok(())
    }

    async fn calculate_cart_total(&self) -> Result<Price, ActorError> {
        self.enter("calculateCartTotal").await?;
        let caller = self.caller()?;
        let backend = lock(&self.state.backend);
        foodhub_core::transforms::cart_grand_total(&Self::cart_items(&backend, caller))
            .ok_or_else(|| ActorError::Rejected("Cart total overflow".to_string()))
    }

    async fn place_order(&self) -> Result<OrderId, ActorError> {
        self.enter("placeOrder").await?;
        let caller = self.caller()?.clone();
        let mut backend = lock(&self.state.backend);
        let items = Self::cart_items(&backend, &caller);
        if items.is_empty() {
            return Err(ActorError::Rejected("Cart is empty".to_string()));
        }
        let id = OrderId::new(backend.next_order_id);
        backend.next_order_id += 1;
        let total_price = foodhub_core::transforms::cart_grand_total(&items)
            .ok_or_else(|| ActorError::Rejected("Cart total overflow".to_string()))?;
        backend.orders.push(OrderRecord {
            id,
            user: caller.clone(),
            items,
            total_price,
            status: OrderStatus::Pending,
        });
        backend.carts.remove(&caller);
        Ok(id)
    }

    async fn get_order_history(&self) -> Result<Vec<OrderRecord>, ActorError> {
        self.enter("getOrderHistory").await?;
        let caller = self.caller()?;
        Ok(lock(&self.state.backend)
            .orders
            .iter()
            .filter(|order| &order.user == caller)
            .cloned()
            .collect())
    }

    async fn get_all_orders_by_total_price_desc(&self) -> Result<Vec<OrderRecord>, ActorError> {
        self.enter("getAllOrdersByTotalPriceDesc").await?;
        let backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        let mut orders = backend.orders.clone();
        orders.sort_by(|a, b| b.total_price.cmp(&a.total_price));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ActorError> {
        self.enter("updateOrderStatus").await?;
        let mut backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        let order = backend
            .orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or_else(|| ActorError::Rejected("Order not found".to_string()))?;
        order.status = status;
        Ok(())
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError> {
        self.enter("getCallerUserProfile").await?;
        let caller = self.caller()?;
        Ok(lock(&self.state.backend).profiles.get(caller).cloned())
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), ActorError> {
        self.enter("saveCallerUserProfile").await?;
        let caller = self.caller()?.clone();
        lock(&self.state.backend).profiles.insert(caller, profile);
        Ok(())
    }

    async fn get_user_profile(&self, user: Principal) -> Result<Option<UserProfile>, ActorError> {
        self.enter("getUserProfile").await?;
        Ok(lock(&self.state.backend).profiles.get(&user).cloned())
    }

    async fn is_caller_admin(&self) -> Result<bool, ActorError> {
        self.enter("isCallerAdmin").await?;
        let backend = lock(&self.state.backend);
        Ok(self
            .caller
            .as_ref()
            .is_some_and(|caller| backend.roles.get(caller) == Some(&UserRole::Admin)))
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, ActorError> {
        self.enter("getCallerUserRole").await?;
        let backend = lock(&self.state.backend);
        Ok(self
            .caller
            .as_ref()
            .map_or(UserRole::Guest, |caller| {
                backend.roles.get(caller).copied().unwrap_or(UserRole::User)
            }))
    }

    async fn assign_caller_user_role(
        &self,
        user: Principal,
        role: UserRole,
    ) -> Result<(), ActorError> {
        self.enter("assignCallerUserRole").await?;
        let mut backend = lock(&self.state.backend);
        self.require_admin(&backend)?;
        backend.roles.insert(user, role);
        Ok(())
    }
}
