//! In-memory collaborators shared by the integration tests.
//!
//! The fakes implement the same traits as the PostgreSQL, Redis and OAuth
//! adapters so services and routes run unchanged without infrastructure.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use artisan_catalog::api::{create_router, AppState};
use artisan_catalog::config::Config;
use artisan_catalog::domain::{
    Admin, AdminRef, AuthProvider, CatalogStats, CategoryCount, PageRequest, Product,
    ProductChanges, ProductFilter, ProductStatus, Role, SocialProfile, SortField, SortOrder, User,
};
use artisan_catalog::errors::{AppError, AppResult};
use artisan_catalog::infra::{
    AdminRepository, CacheStore, HealthCheck, IdentityProvider, ProductRepository, UnitOfWork,
    UserRepository,
};
use artisan_catalog::services::{
    AuthService, Authenticator, CatalogManager, CatalogService, TokenIssuer,
};

pub const TEST_SECRET: &str = "integration-test-secret-key-0123456789";
pub const FRONTEND_URL: &str = "http://frontend.test";

// =============================================================================
// Repositories
// =============================================================================

#[derive(Default)]
pub struct AdminTable {
    rows: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminRepository for AdminTable {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        Ok(self.find_by_email(email).await?.filter(|a| a.is_active))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Admin>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, email: String, password_hash: String) -> AppResult<Admin> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.email == email) {
            return Err(AppError::conflict("Admin"));
        }
        let now = Utc::now();
        let admin = Admin {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role: Role::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        rows.push(admin.clone());
        Ok(admin)
    }

    async fn find_refs(&self, ids: &[Uuid]) -> AppResult<Vec<AdminRef>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| ids.contains(&a.id))
            .map(|a| AdminRef {
                id: a.id,
                email: Some(a.email.clone()),
            })
            .collect())
    }
}

#[derive(Default)]
pub struct UserTable {
    rows: Mutex<Vec<User>>,
}

impl UserTable {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for UserTable {
    async fn find_by_email_or_provider(
        &self,
        email: &str,
        provider: AuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.email == email || (u.provider == provider && u.provider_id == provider_id))
            .cloned())
    }

    async fn create(&self, profile: SocialProfile) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: profile.name,
            email: profile.email,
            avatar: profile.avatar,
            provider: profile.provider,
            provider_id: profile.provider_id,
            role: Role::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn refresh_profile(
        &self,
        id: Uuid,
        name: String,
        avatar: Option<String>,
    ) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User"))?;
        user.name = name;
        user.avatar = avatar;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Default)]
pub struct ProductTable {
    rows: Mutex<Vec<Product>>,
}

impl ProductTable {
    pub fn get(&self, id: Uuid) -> Option<Product> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    fn matching(&self, filter: &ProductFilter) -> Vec<Product> {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        };

        let mut rows: Vec<Product> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.status == filter.status)
            .filter(|p| filter.category.map_or(true, |c| p.category == c))
            .filter(|p| filter.condition.map_or(true, |c| p.condition == c))
            .filter(|p| filter.is_featured.map_or(true, |f| p.is_featured == f))
            .filter(|p| filter.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| filter.max_price.map_or(true, |max| p.price <= max))
            .filter(|p| contains(&p.origin, &filter.origin))
            .filter(|p| contains(&p.artist, &filter.artist))
            .filter(|p| {
                let document = format!("{} {} {}", p.name, p.description, p.tags.join(" "));
                contains(&document, &filter.search)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                SortField::Price => a.price.total_cmp(&b.price),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Stock => a.stock.cmp(&b.stock),
                SortField::ViewCount => a.view_count.cmp(&b.view_count),
                SortField::AverageRating => a.average_rating.total_cmp(&b.average_rating),
                SortField::YearCreated => a.year_created.cmp(&b.year_created),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ordering = match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });
        rows
    }
}

#[async_trait]
impl ProductRepository for ProductTable {
    async fn insert(&self, product: &Product) -> AppResult<Product> {
        self.rows.lock().unwrap().push(product.clone());
        Ok(product.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.get(id))
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Product>, u64)> {
        let rows = self.matching(filter);
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn find_recent(&self, filter: &ProductFilter, limit: u64) -> AppResult<Vec<Product>> {
        Ok(self
            .matching(filter)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ProductChanges,
        modified_by: Uuid,
    ) -> AppResult<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply(changes.clone(), modified_by);
            product.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(product) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let Some(stock) = product.stock.checked_add(delta).filter(|s| *s >= 0) else {
            return Ok(None);
        };
        product.stock = stock;
        product.status = product.status.after_stock_change(stock);
        Ok(Some(product.clone()))
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(product) = rows.iter_mut().find(|p| p.id == id) {
            product.view_count += 1;
        }
        Ok(())
    }

    async fn stats(&self) -> AppResult<CatalogStats> {
        let rows = self.rows.lock().unwrap();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for product in rows.iter() {
            *counts.entry(product.category.to_string()).or_default() += 1;
        }
        let mut category_stats: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        category_stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

        let total_value: f64 = rows.iter().map(|p| p.price).sum();
        Ok(CatalogStats {
            total_products: rows.len() as u64,
            active_products: rows
                .iter()
                .filter(|p| p.status == ProductStatus::Active)
                .count() as u64,
            total_value,
            average: if rows.is_empty() {
                0.0
            } else {
                total_value / rows.len() as f64
            },
            total_stock: rows.iter().map(|p| i64::from(p.stock)).sum(),
            category_stats,
        })
    }
}

/// Repositories behind one Unit of Work
#[derive(Default)]
pub struct InMemoryStore {
    pub admins: Arc<AdminTable>,
    pub users: Arc<UserTable>,
    pub products: Arc<ProductTable>,
}

impl UnitOfWork for InMemoryStore {
    fn admins(&self) -> Arc<dyn AdminRepository> {
        self.admins.clone()
    }

    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }
}

// =============================================================================
// Cache, health and identity provider
// =============================================================================

#[derive(Default)]
pub struct MemoryCache {
    counters: Mutex<HashMap<String, u64>>,
    oauth_states: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl HealthCheck for MemoryCache {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(identifier.to_string()).or_default();
        *count += 1;
        Ok((*count, *count <= max_requests))
    }

    async fn save_oauth_state(
        &self,
        state: &str,
        provider: &str,
        _ttl_seconds: u64,
    ) -> AppResult<()> {
        self.oauth_states
            .lock()
            .unwrap()
            .insert(state.to_string(), provider.to_string());
        Ok(())
    }

    async fn take_oauth_state(&self, state: &str) -> AppResult<Option<String>> {
        Ok(self.oauth_states.lock().unwrap().remove(state))
    }
}

pub struct AlwaysUp;

#[async_trait]
impl HealthCheck for AlwaysUp {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Accepts the code `valid-code` and returns a fixed profile
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_url(&self, provider: AuthProvider, state: &str) -> AppResult<String> {
        Ok(format!("https://{}.provider.test/consent?state={}", provider, state))
    }

    async fn fetch_profile(&self, provider: AuthProvider, code: &str) -> AppResult<SocialProfile> {
        if code != "valid-code" {
            return Err(AppError::upstream("code rejected"));
        }
        Ok(social_profile(provider, "p-100", "ada@example.com"))
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn social_profile(provider: AuthProvider, provider_id: &str, email: &str) -> SocialProfile {
    SocialProfile {
        provider,
        provider_id: provider_id.to_string(),
        email: email.to_string(),
        name: "Ada Obi".to_string(),
        avatar: None,
    }
}

pub fn config() -> Config {
    Config::with_secret(TEST_SECRET).unwrap()
}

pub fn authenticator(store: Arc<InMemoryStore>) -> Authenticator<InMemoryStore> {
    Authenticator::new(store, TokenIssuer::new(&config()))
}

/// Router wired to in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub auth: Arc<dyn AuthService>,
    pub catalog: Arc<dyn CatalogService>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let auth: Arc<dyn AuthService> = Arc::new(authenticator(store.clone()));
        let catalog: Arc<dyn CatalogService> = Arc::new(CatalogManager::new(store.clone()));

        let state = AppState::new(
            auth.clone(),
            catalog.clone(),
            Arc::new(StubProvider),
            Arc::new(MemoryCache::default()),
            Arc::new(AlwaysUp),
            FRONTEND_URL,
        );

        Self {
            router: create_router(state),
            store,
            auth,
            catalog,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register an admin and return its bearer token
    pub async fn admin_token(&self) -> String {
        let email = format!("curator-{}@example.com", Uuid::new_v4().simple());
        self.auth
            .register_admin(email.clone(), "s3cret!".to_string())
            .await
            .unwrap();
        self.auth
            .login_admin(email, "s3cret!".to_string())
            .await
            .unwrap()
            .token
            .access_token
    }

    /// Sign in a social user and return its bearer token
    pub async fn user_token(&self) -> String {
        self.auth
            .login_social_user(social_profile(AuthProvider::Google, "g-1", "user@example.com"))
            .await
            .unwrap()
            .token
            .access_token
    }
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
