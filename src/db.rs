pub mod document_store;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod outbox_repo;
