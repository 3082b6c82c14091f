/*!
 * Tests for error types and conversions
 */

use ytsubs::errors::{AppError, InvalidUrl, ProviderError, RetrievalError};

#[test]
fn test_providerError_connectionError_shouldBeTransient() {
    let error = ProviderError::ConnectionError("Connection refused".to_string());
    assert!(error.is_transient());
    assert!(error.to_string().contains("Connection refused"));
}

#[test]
fn test_providerError_serverStatus_shouldBeTransient() {
    for status_code in [500, 502, 503, 504] {
        let error = ProviderError::ApiError {
            status_code,
            message: "overloaded".to_string(),
        };
        assert!(error.is_transient(), "{} should be transient", status_code);
    }
}

#[test]
fn test_providerError_clientStatus_shouldNotBeTransient() {
    for status_code in [400, 404, 422, 429] {
        let error = ProviderError::ApiError {
            status_code,
            message: "nope".to_string(),
        };
        assert!(!error.is_transient(), "{} should not be transient", status_code);
    }
}

#[test]
fn test_providerError_shapeAndExtractionErrors_shouldNotBeTransient() {
    let errors = [
        ProviderError::ParseError("bad json".to_string()),
        ProviderError::ValidationError("missing title".to_string()),
        ProviderError::ExtractionError("captcha".to_string()),
        ProviderError::NoCaptions("abc123".to_string()),
    ];

    for error in errors {
        assert!(!error.is_transient(), "{:?} should not be transient", error);
    }
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("503"));
    assert!(display.contains("Service unavailable"));
    assert_eq!(error.reason(), "Service unavailable");
}

#[test]
fn test_retrievalError_invalidUrl_shouldKeepResolverMessage() {
    let error = RetrievalError::from(InvalidUrl::new("https://example.com"));
    assert_eq!(error.message(), "Invalid YouTube URL: https://example.com");
    assert!(error.is_client_error());
}

#[test]
fn test_retrievalError_providerFailed_shouldNameProviderAndCause() {
    let error = RetrievalError::ProviderFailed {
        provider: "direct".to_string(),
        source: ProviderError::NoCaptions("abc123".to_string()),
    };

    assert_eq!(error.message(), "direct failed: No captions available for video abc123");
    assert!(!error.is_client_error());
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_appError_fromRetrievalError_shouldWrap() {
    let error: AppError = RetrievalError::NoProviders.into();
    assert!(matches!(error, AppError::Retrieval(RetrievalError::NoProviders)));
    assert!(error.to_string().contains("No caption providers configured"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}
