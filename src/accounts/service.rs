use super::validation::{ProfileChanges, Registration};
use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::db::DatabaseClient;
use crate::storage::BlobStore;
use crate::types::{AppError, ImageUpload, Result, User, UserProfile};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default key prefix for uploaded profile images.
pub const DEFAULT_IMAGE_FOLDER: &str = "Users";

/// A freshly issued session token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user_id: String,
    pub token: String,
}

/// Account workflows on top of the record store, blob store, hasher and token service.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<dyn DatabaseClient>,
    blobs: Arc<dyn BlobStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    image_folder: String,
}

impl AccountService {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        blobs: Arc<dyn BlobStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            db,
            blobs,
            hasher,
            tokens,
            image_folder: DEFAULT_IMAGE_FOLDER.to_string(),
        }
    }

    pub fn with_image_folder(mut self, folder: impl Into<String>) -> Self {
        self.image_folder = folder.into().trim_matches('/').to_string();
        self
    }

    /// Create an account and issue its first token.
    ///
    /// Steps run strictly in order: duplicate pre-check, hash, upload, insert,
    /// issue. The store's unique email constraint decides concurrent races.
    pub async fn register(&self, registration: Registration) -> Result<IssuedToken> {
        let Registration {
            profile,
            password,
            image,
        } = registration;

        if self.db.get_user_by_email(&profile.email).await?.is_some() {
            debug!("Registration rejected, email already taken");
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = self.hasher.hash_async(password).await?;
        let image_url = self.upload_image(image).await?;

        let now = chrono::Utc::now().timestamp();
        let user = User {
            id: Uuid::new_v4().to_string(),
            password_hash,
            name: profile.name,
            email: profile.email,
            gender: profile.gender,
            age: profile.age,
            address: profile.address,
            city: profile.city,
            state: profile.state,
            zip: profile.zip,
            image_url,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.db.create_user(&user).await {
            warn!(image_url = %user.image_url, error = %e, "Registration failed after upload, image orphaned");
            return Err(e);
        }

        let token = self.tokens.issue_default(&user.id)?;
        info!(user_id = %user.id, "User registered");

        Ok(IssuedToken {
            user_id: user.id,
            token,
        })
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let email = email.trim();

        let user = match self.db.get_user_by_email(email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy_async(password.to_string()).await;
                debug!("Login failed for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let matches = self
            .hasher
            .verify_async(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            debug!(user_id = %user.id, "Login failed, password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue_default(&user.id)?;
        info!(user_id = %user.id, "User logged in");

        Ok(IssuedToken {
            user_id: user.id,
            token,
        })
    }

    /// Apply a partial update to the caller's own profile.
    pub async fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> Result<()> {
        let ProfileChanges {
            mut update,
            password,
            image,
        } = changes;

        if let Some(password) = password {
            update.password_hash = Some(self.hasher.hash_async(password).await?);
        }

        if let Some(image) = image {
            update.image_url = Some(self.upload_image(image).await?);
        }

        if update.is_empty() {
            debug!(user_id = %user_id, "Profile update with no changes");
            return Ok(());
        }

        let rotated = update.password_hash.is_some();
        let updated = match self.db.update_user(user_id, &update).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(url) = &update.image_url {
                    warn!(image_url = %url, error = %e, "Profile update failed after upload, image orphaned");
                }
                return Err(e);
            }
        };

        if !updated {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, password_rotated = rotated, "User details updated");
        Ok(())
    }

    /// Remove the account record. Stored images are left in place.
    pub async fn delete_account(&self, user_id: &str) -> Result<()> {
        if !self.db.delete_user(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        self.db
            .get_user_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        let users = self.db.list_users().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<String> {
        let path = format!("{}/{}", self.image_folder, Uuid::new_v4());
        let content_type = image.content_type.clone().or_else(|| {
            image
                .file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first_raw())
                .map(str::to_string)
        });

        let url = self
            .blobs
            .store(image.bytes, &path, content_type.as_deref())
            .await?;
        debug!(path = %path, "Uploaded profile image");

        Ok(url)
    }
}
