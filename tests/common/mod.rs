//! Shared harness: spawns the server on a random port with in-memory storages

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use storefront::auth::{PasswordHasher, TokenHelper};
use storefront::cache::MemoryCache;
use storefront::configuration::JwtSettings;
use storefront::error::{AppError, Resource};
use storefront::models::{
    Category, CreateCategory, CreateProduct, Product, UpdateProduct, UpdateUser, User,
};
use storefront::startup::{run, AppListener, AppState};
use storefront::storage::{CategoryStorage, ProductStorage, UserStorage};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub cache: Arc<MemoryCache>,
    pub tokens: Arc<TokenHelper>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST /users with a matching repeat password
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users"))
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "password": password,
                "repeat_password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!(
                "{}?username={}&password={}",
                self.url("/users/login/"),
                urlencoding::encode(username),
                urlencoding::encode(password)
            ))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .put(self.url("/users/login/"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Application state over empty in-memory storages
pub fn test_state() -> (AppState, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new(1024 * 1024));
    let settings = JwtSettings {
        secret: TEST_SECRET.to_string(),
    };
    let tokens = Arc::new(TokenHelper::new(&settings, cache.clone()).expect("valid jwt settings"));

    let state = AppState {
        users: Arc::new(InMemoryUsers::default()),
        products: Arc::new(InMemoryProducts::default()),
        categories: Arc::new(InMemoryCategories::default()),
        hasher: PasswordHasher::default(),
        tokens,
    };
    (state, cache)
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let (state, cache) = test_state();
    let tokens = state.tokens.clone();

    let server = run(AppListener::Tcp(listener), state).expect("Failed to create server");
    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        cache,
        tokens,
    }
}

/// Row storage with SERIAL-style ids
struct Table<T> {
    rows: Vec<T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    table: Mutex<Table<User>>,
}

#[async_trait]
impl UserStorage for InMemoryUsers {
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut table = self.table.lock();
        if table
            .rows
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(AppError::AlreadyExists(Resource::User));
        }
        let user = User {
            id: table.allocate_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.table.lock().rows.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<User, AppError> {
        let table = self.table.lock();
        table.rows.iter().find(|u| u.id == id).cloned().ok_or(AppError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        let table = self.table.lock();
        table
            .rows
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let table = self.table.lock();
        table
            .rows
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i32, update: &UpdateUser) -> Result<User, AppError> {
        let mut table = self.table.lock();
        let clash = table.rows.iter().any(|u| {
            u.id != id
                && (update.username.as_deref() == Some(u.username.as_str())
                    || update.email.as_deref() == Some(u.email.as_str()))
        });
        if clash {
            return Err(AppError::AlreadyExists(Resource::User));
        }
        let user = table
            .rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(username) = &update.username {
            user.username = username.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(password) = &update.password {
            user.password_hash = password.clone();
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut table = self.table.lock();
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        if table.rows.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProducts {
    table: Mutex<Table<Product>>,
}

#[async_trait]
impl ProductStorage for InMemoryProducts {
    async fn create(&self, product: &CreateProduct) -> Result<Product, AppError> {
        let mut table = self.table.lock();
        if table.rows.iter().any(|p| p.title == product.title) {
            return Err(AppError::AlreadyExists(Resource::Product));
        }
        let product = Product {
            id: table.allocate_id(),
            title: product.title.clone(),
            description: product.description.clone(),
            owner_id: product.owner_id,
        };
        table.rows.push(product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.table.lock().rows.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Product, AppError> {
        let table = self.table.lock();
        table.rows.iter().find(|p| p.id == id).cloned().ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i32, update: &UpdateProduct) -> Result<Product, AppError> {
        let mut table = self.table.lock();
        if let Some(title) = &update.title {
            if table.rows.iter().any(|p| p.id != id && &p.title == title) {
                return Err(AppError::AlreadyExists(Resource::Product));
            }
        }
        let product = table
            .rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(title) = &update.title {
            product.title = title.clone();
        }
        if let Some(description) = &update.description {
            product.description = description.clone();
        }
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut table = self.table.lock();
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        if table.rows.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCategories {
    table: Mutex<Table<Category>>,
}

#[async_trait]
impl CategoryStorage for InMemoryCategories {
    async fn create(&self, category: &CreateCategory) -> Result<Category, AppError> {
        let mut table = self.table.lock();
        if table.rows.iter().any(|c| c.title == category.title) {
            return Err(AppError::AlreadyExists(Resource::Category));
        }
        let category = Category {
            id: table.allocate_id(),
            title: category.title.clone(),
            child_id: category.child_id,
        };
        table.rows.push(category.clone());
        Ok(category)
    }

    async fn find_all(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.table.lock().rows.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Category, AppError> {
        let table = self.table.lock();
        table.rows.iter().find(|c| c.id == id).cloned().ok_or(AppError::NotFound)
    }

    async fn find_by_title(&self, title: &str) -> Result<Category, AppError> {
        let table = self.table.lock();
        table
            .rows
            .iter()
            .find(|c| c.title == title)
            .cloned()
            .ok_or(AppError::NotFound)
    }
}
