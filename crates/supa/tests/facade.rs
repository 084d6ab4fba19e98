//! Tests for the umbrella crate's re-exports.

use supa::prelude::*;

#[test]
fn prelude_builds_storage_client() {
    let supa = Supa::new(SupaConfig::new("https://example.supabase.co", "key")).unwrap();
    let storage: StorageClient = supa.storage().unwrap();
    assert_eq!(storage.base_url().path(), "/storage/v1");
}

#[test]
fn storage_errors_convert_into_supa_error() {
    fn check(storage: Result<(), StorageError>) -> SupaResult<()> {
        storage?;
        Ok(())
    }
    let err = check(Err(StorageError::InvalidConfig("bad".into()))).unwrap_err();
    assert!(matches!(err, SupaError::Storage(msg) if msg.contains("bad")));
}

#[test]
fn config_errors_surface_before_any_request() {
    let err = Supa::new(SupaConfig::new("https://example.supabase.co", "")).unwrap_err();
    assert!(matches!(err, SupaError::Config(_)));
}

#[test]
fn service_body_is_read_before_converting() {
    fn fetch() -> Result<(), StorageError> {
        Err(StorageError::Api(ServiceError {
            status: 400,
            body: serde_json::json!({
                "statusCode": "404",
                "error": "Bucket not found",
                "message": "The resource was not found",
            }),
        }))
    }

    let err = fetch().unwrap_err();
    let service = err.service_error().unwrap();
    assert_eq!(service.body["error"], "Bucket not found");
    assert!(err.is_not_found());

    let converted = SupaError::from(err);
    let SupaError::Storage(text) = converted else {
        panic!("expected storage error");
    };
    assert!(text.contains("The resource was not found"));
    assert!(!text.contains("Bucket not found"));
}
