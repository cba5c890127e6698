pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Value objects
    BucketName,
    Credentials,
    Delimiter,
    ObjectKey,
    VersionId,
    // Errors
    DomainValidationError,
    MediatorError,
    MediatorResult,
    UpstreamError,
    UpstreamErrorKind,
};

// Port types - interfaces for external systems
pub use ports::{
    AdminOps, AdminService, BucketService, BucketStore, ListingStore, ObjectService,
    UpstreamConnector, UpstreamStore,
};

// Service implementations - business logic
pub use services::{
    AdminServiceImpl, AttributeAggregator, BucketServiceImpl, HierarchyBuilder, ObjectServiceImpl,
    PaginationWalker, PrefixDeleter, Reconciler,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, create_s3_app, App, AppBuilder, AppConfig,
    AppError, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{
    AddressingStyle, InMemoryStore, MemoryConnector, RgwAdminClient, S3Config, S3Connector,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_s3_app, AppBuilder, BucketName, BucketService,
        BucketServiceImpl, Credentials, Delimiter, InMemoryStore, MemoryConnector, ObjectKey,
        ObjectService, ObjectServiceImpl, S3Connector, UpstreamConnector, UpstreamStore,
        VersionId,
    };
}
