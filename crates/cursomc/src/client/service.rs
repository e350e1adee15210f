//! Client service for business logic.
//!
//! Every operation takes the caller's principal explicitly. Reads and updates
//! of a single client are open to that client and to administrators; listing,
//! paging and deletion are administrator-only.

use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{
    Client, ClientKind, ClientSummary, NewAddress, NewClient, NewClientRequest, Page, PageRequest,
    PageSpec, UpdateClientRequest,
};
use super::repository::ClientRepository;
use crate::auth::policy::{require_authenticated, require_owner_or_admin, require_role};
use crate::auth::{Owner, Principal, Role, hash_password};
use crate::error::{ServiceError, ServiceResult};
use crate::picture;
use crate::storage::Storage;
use crate::validation::{ValidationErrors, is_valid_cnpj, is_valid_cpf, is_valid_email};

const NAME_MIN: usize = 5;
const NAME_MAX: usize = 120;

/// How uploaded profile pictures are named and sized.
#[derive(Debug, Clone)]
pub struct ProfilePictures {
    /// Key prefix; the stored key is `<prefix><client id>.jpg`.
    pub prefix: String,
    /// Side length of the stored square, in pixels.
    pub size: u32,
}

impl Default for ProfilePictures {
    fn default() -> Self {
        Self {
            prefix: "cp".to_string(),
            size: 200,
        }
    }
}

/// Service for client operations.
#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    storage: Arc<dyn Storage>,
    pictures: ProfilePictures,
}

impl ClientService {
    /// Create a new client service.
    pub fn new(repo: ClientRepository, storage: Arc<dyn Storage>, pictures: ProfilePictures) -> Self {
        Self {
            repo,
            storage,
            pictures,
        }
    }

    /// Find a client by ID.
    #[instrument(skip(self, principal))]
    pub async fn find(&self, principal: Option<&Principal>, id: i64) -> ServiceResult<Client> {
        require_owner_or_admin(principal, Owner::Id(id))?;

        self.repo
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Client not found: {id}")))
    }

    /// Find a client by email.
    #[instrument(skip(self, principal))]
    pub async fn find_by_email(
        &self,
        principal: Option<&Principal>,
        email: &str,
    ) -> ServiceResult<Client> {
        require_owner_or_admin(principal, Owner::Email(email))?;

        self.repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Client not found: {email}")))
    }

    /// List every client.
    #[instrument(skip(self, principal))]
    pub async fn find_all(&self, principal: Option<&Principal>) -> ServiceResult<Vec<ClientSummary>> {
        require_role(principal, Role::Admin)?;
        Ok(self.repo.list().await?)
    }

    /// One page of clients.
    #[instrument(skip(self, principal))]
    pub async fn find_page(
        &self,
        principal: Option<&Principal>,
        request: &PageRequest,
    ) -> ServiceResult<Page<ClientSummary>> {
        require_role(principal, Role::Admin)?;

        let spec = PageSpec::try_from(request).map_err(ServiceError::BadRequest)?;
        let (content, total) = self.repo.page(&spec).await?;

        Ok(Page::new(content, total, &spec))
    }

    /// Register a new client. Open to everyone.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn insert(&self, request: NewClientRequest) -> ServiceResult<i64> {
        let mut errors = validate_new_client(&request);
        if !errors.has_field("email") && self.repo.id_by_email(request.email.trim()).await?.is_some() {
            errors.add("email", "Email already registered");
        }
        errors.into_result()?;

        let kind = ClientKind::from_code(request.kind)
            .ok_or_else(|| ServiceError::bad_request("Invalid client kind"))?;
        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(e.into()))??;

        let client = NewClient {
            phones: request.phones(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            document: request.document.trim().to_string(),
            kind,
            password_hash,
            address: NewAddress {
                street: request.street,
                number: request.number,
                complement: request.complement,
                district: request.district,
                zip_code: request.zip_code,
                city_id: request.city_id,
            },
        };

        let id = self.repo.insert(&client).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::DataIntegrity(_) => {
                ServiceError::data_integrity("Unknown city or email already registered")
            }
            other => other,
        })?;

        info!(client_id = id, "Registered new client");
        Ok(id)
    }

    /// Change a client's name and email.
    #[instrument(skip(self, principal, request))]
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: i64,
        request: UpdateClientRequest,
    ) -> ServiceResult<()> {
        require_owner_or_admin(principal, Owner::Id(id))?;

        let mut errors = validate_update(&request);
        if !errors.has_field("email") {
            let owner = self.repo.id_by_email(request.email.trim()).await?;
            if owner.is_some_and(|owner| owner != id) {
                errors.add("email", "Email already registered");
            }
        }
        errors.into_result()?;

        let updated = self
            .repo
            .update(id, request.name.trim(), request.email.trim())
            .await
            .map_err(email_conflict)?;
        if !updated {
            return Err(ServiceError::not_found(format!("Client not found: {id}")));
        }

        info!(client_id = id, "Updated client");
        Ok(())
    }

    /// Delete a client.
    #[instrument(skip(self, principal))]
    pub async fn delete(&self, principal: Option<&Principal>, id: i64) -> ServiceResult<()> {
        require_role(principal, Role::Admin)?;

        let deleted = self.repo.delete(id).await.map_err(|e| match ServiceError::from(e) {
            ServiceError::DataIntegrity(_) => {
                ServiceError::data_integrity("Cannot delete a client with related records")
            }
            other => other,
        })?;

        if !deleted {
            return Err(ServiceError::not_found(format!("Client not found: {id}")));
        }

        info!(client_id = id, "Deleted client");
        Ok(())
    }

    /// Store `upload` as the caller's profile picture and return its public URL.
    #[instrument(skip(self, principal, upload), fields(bytes = upload.len()))]
    pub async fn upload_profile_picture(
        &self,
        principal: Option<&Principal>,
        upload: Vec<u8>,
    ) -> ServiceResult<String> {
        let principal = require_authenticated(principal)?;

        let size = self.pictures.size;
        let jpeg = tokio::task::spawn_blocking(move || picture::profile_picture(&upload, size))
            .await
            .map_err(|e| ServiceError::Internal(e.into()))??;

        let key = format!("{}{}.jpg", self.pictures.prefix, principal.id);
        self.storage.write(&key, &jpeg).await?;

        info!(client_id = principal.id, key = %key, "Stored profile picture");
        Ok(self.storage.public_url(&key))
    }
}

fn validate_name_and_email(name: &str, email: &str, errors: &mut ValidationErrors) {
    errors.length("name", name, NAME_MIN, NAME_MAX);

    if email.trim().is_empty() {
        errors.add("email", "Required field");
    } else if !is_valid_email(email.trim()) {
        errors.add("email", "Invalid email");
    }
}

/// A uniqueness violation on update can only come from the email column.
fn email_conflict(err: anyhow::Error) -> ServiceError {
    match ServiceError::from(err) {
        ServiceError::DataIntegrity(_) => ServiceError::data_integrity("Email already registered"),
        other => other,
    }
}

/// Field checks for a registration request, except email uniqueness.
pub fn validate_new_client(request: &NewClientRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_name_and_email(&request.name, &request.email, &mut errors);

    errors.require("password", &request.password, "Required field");

    let document = request.document.trim();
    match ClientKind::from_code(request.kind) {
        None => errors.add("kind", "Invalid client kind"),
        Some(_) if document.is_empty() => errors.add("document", "Required field"),
        Some(ClientKind::Individual) if !is_valid_cpf(document) => {
            errors.add("document", "Invalid CPF")
        }
        Some(ClientKind::Company) if !is_valid_cnpj(document) => {
            errors.add("document", "Invalid CNPJ")
        }
        Some(_) => {}
    }

    errors.require("street", &request.street, "Required field");
    errors.require("number", &request.number, "Required field");
    errors.require("zip_code", &request.zip_code, "Required field");
    errors.require("phone1", &request.phone1, "Required field");

    errors
}

/// Field checks for an update request, except email uniqueness.
pub fn validate_update(request: &UpdateClientRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_name_and_email(&request.name, &request.email, &mut errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessDenied;
    use crate::db::{Database, instantiate_test_database};
    use crate::storage::LocalStorage;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Fixture {
        service: ClientService,
        maria: Principal,
        ana: Principal,
        campinas: i64,
        media: TempDir,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        instantiate_test_database(db.pool()).await.unwrap();
        let media = TempDir::new().unwrap();

        let repo = ClientRepository::new(db.pool().clone());
        let maria_id = repo.id_by_email("maria@example.com").await.unwrap().unwrap();
        let ana_id = repo.id_by_email("ana@example.com").await.unwrap().unwrap();
        let campinas = sqlx::query_scalar("SELECT id FROM cities WHERE name = 'Campinas'")
            .fetch_one(db.pool())
            .await
            .unwrap();

        let storage = Arc::new(LocalStorage::new(media.path(), "/media"));
        Fixture {
            service: ClientService::new(repo, storage, ProfilePictures::default()),
            maria: Principal::new(maria_id, "maria@example.com", [Role::Customer]),
            ana: Principal::new(ana_id, "ana@example.com", [Role::Customer, Role::Admin]),
            campinas,
            media,
        }
    }

    fn new_client_request(email: &str, city_id: i64) -> NewClientRequest {
        NewClientRequest {
            name: "Joana Prado".to_string(),
            email: email.to_string(),
            document: "11222333000181".to_string(),
            kind: 2,
            password: "s3cret".to_string(),
            street: "Rua Augusta".to_string(),
            number: "1500".to_string(),
            zip_code: "01304001".to_string(),
            phone1: "11999990000".to_string(),
            city_id,
            ..NewClientRequest::default()
        }
    }

    #[tokio::test]
    async fn test_update_unique_violation_reports_taken_email() {
        let f = fixture().await;

        // Same write as a concurrent update that passed the email check.
        let err = f
            .service
            .repo
            .update(f.maria.id, "Maria Silva", "ana@example.com")
            .await
            .unwrap_err();

        match email_conflict(err) {
            ServiceError::DataIntegrity(msg) => assert_eq!(msg, "Email already registered"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn assert_denied<T: std::fmt::Debug>(result: ServiceResult<T>) {
        assert!(
            matches!(result, Err(ServiceError::AccessDenied(AccessDenied))),
            "expected access denied, got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_find_own_client() {
        let f = fixture().await;
        let client = f.service.find(Some(&f.maria), f.maria.id).await.unwrap();
        assert_eq!(client.email, "maria@example.com");
    }

    #[tokio::test]
    async fn test_find_other_client_denied() {
        let f = fixture().await;
        assert_denied(f.service.find(Some(&f.maria), f.ana.id).await);
        assert_denied(f.service.find(None, f.maria.id).await);
        // Access is checked before existence.
        assert_denied(f.service.find(Some(&f.maria), 9999).await);
    }

    #[tokio::test]
    async fn test_admin_finds_anyone() {
        let f = fixture().await;
        let client = f.service.find(Some(&f.ana), f.maria.id).await.unwrap();
        assert_eq!(client.name, "Maria Silva");

        let err = f.service.find(Some(&f.ana), 9999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let f = fixture().await;
        assert!(
            f.service
                .find_by_email(Some(&f.maria), "maria@example.com")
                .await
                .is_ok()
        );
        assert_denied(
            f.service
                .find_by_email(Some(&f.maria), "ana@example.com")
                .await,
        );
        let err = f
            .service
            .find_by_email(Some(&f.ana), "nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_listing_requires_admin() {
        let f = fixture().await;
        assert_denied(f.service.find_all(Some(&f.maria)).await);
        assert_denied(f.service.find_page(Some(&f.maria), &PageRequest::default()).await);

        assert_eq!(f.service.find_all(Some(&f.ana)).await.unwrap().len(), 2);
        let page = f
            .service
            .find_page(Some(&f.ana), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.content[0].name, "Ana Costa");
    }

    #[tokio::test]
    async fn test_bad_page_request() {
        let f = fixture().await;
        let request = PageRequest {
            order_by: "password_hash".to_string(),
            ..PageRequest::default()
        };
        let err = f.service.find_page(Some(&f.ana), &request).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_insert_client() {
        let f = fixture().await;
        let id = f
            .service
            .insert(new_client_request("joana@example.com", f.campinas))
            .await
            .unwrap();

        let joana = f.service.find(Some(&f.ana), id).await.unwrap();
        assert_eq!(joana.kind, ClientKind::Company);
        assert_eq!(joana.roles.iter().collect::<Vec<_>>(), [&Role::Customer]);
    }

    #[tokio::test]
    async fn test_insert_validation() {
        let f = fixture().await;
        let request = NewClientRequest {
            name: "Jo".to_string(),
            document: "11222333000182".to_string(),
            ..new_client_request("maria@example.com", f.campinas)
        };

        let errors = match f.service.insert(request).await {
            Err(ServiceError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert!(errors.has_field("name"));
        assert!(errors.has_field("document"));
        assert!(errors.has_field("email"));
    }

    #[tokio::test]
    async fn test_insert_unknown_city() {
        let f = fixture().await;
        let err = f
            .service
            .insert(new_client_request("joana@example.com", 9999))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DataIntegrity(_)));
    }

    #[test]
    fn test_validate_new_client_requires_fields() {
        let errors = validate_new_client(&NewClientRequest::default());
        for field in [
            "name", "email", "password", "kind", "street", "number", "zip_code", "phone1",
        ] {
            assert!(errors.has_field(field), "{field} should be reported");
        }
    }

    #[test]
    fn test_validate_document_by_kind() {
        let individual = NewClientRequest {
            document: "11222333000181".to_string(),
            kind: 1,
            ..new_client_request("joana@example.com", 1)
        };
        assert!(validate_new_client(&individual).has_field("document"));

        let company = NewClientRequest {
            document: "52998224725".to_string(),
            kind: 2,
            ..new_client_request("joana@example.com", 1)
        };
        assert!(validate_new_client(&company).has_field("document"));
    }

    #[tokio::test]
    async fn test_update_client() {
        let f = fixture().await;
        let request = UpdateClientRequest {
            name: "Maria Souza".to_string(),
            email: "maria@example.com".to_string(),
        };
        f.service
            .update(Some(&f.maria), f.maria.id, request)
            .await
            .unwrap();

        let maria = f.service.find(Some(&f.maria), f.maria.id).await.unwrap();
        assert_eq!(maria.name, "Maria Souza");
    }

    #[tokio::test]
    async fn test_update_rules() {
        let f = fixture().await;
        let taken = UpdateClientRequest {
            name: "Maria Silva".to_string(),
            email: "ana@example.com".to_string(),
        };

        assert_denied(
            f.service
                .update(Some(&f.maria), f.ana.id, taken.clone())
                .await,
        );

        let err = f
            .service
            .update(Some(&f.maria), f.maria.id, taken)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_client() {
        let f = fixture().await;
        assert_denied(f.service.delete(Some(&f.maria), f.maria.id).await);

        f.service.delete(Some(&f.ana), f.maria.id).await.unwrap();
        let err = f.service.delete(Some(&f.ana), f.maria.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_profile_picture() {
        let f = fixture().await;
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(300, 240))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        assert_denied(f.service.upload_profile_picture(None, png.clone()).await);

        let url = f
            .service
            .upload_profile_picture(Some(&f.maria), png)
            .await
            .unwrap();
        assert_eq!(url, format!("/media/cp{}.jpg", f.maria.id));

        let stored = std::fs::read(f.media.path().join(format!("cp{}.jpg", f.maria.id))).unwrap();
        let img = image::load_from_memory(&stored).unwrap();
        assert_eq!((img.width(), img.height()), (200, 200));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let f = fixture().await;
        let err = f
            .service
            .upload_profile_picture(Some(&f.maria), b"not an image".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }
}
