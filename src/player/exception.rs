//! Playback failures reported by a player
//!
//! A [`PlaybackException`] carries an [`ErrorCode`] from a fixed taxonomy,
//! the monotonic time it was raised at, an optional message and an optional
//! underlying cause.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils;
use crate::utils::error::{MediaError, Result};

/// Codes of [`ErrorCode::Custom`] start here.
pub const CUSTOM_ERROR_CODE_BASE: i32 = 1_000_000;

macro_rules! error_codes {
    ($($variant:ident = $code:literal => $name:literal),* $(,)?) => {
        /// Classification of a playback failure.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ErrorCode {
            $($variant,)*
            /// An application defined code, at least [`CUSTOM_ERROR_CODE_BASE`].
            Custom(i32),
        }

        impl ErrorCode {
            pub fn code(self) -> i32 {
                match self {
                    $(ErrorCode::$variant => $code,)*
                    ErrorCode::Custom(code) => code,
                }
            }

            /// Maps an integer code back; unknown codes below the custom
            /// range are rejected.
            pub fn from_code(code: i32) -> Result<Self> {
                match code {
                    $($code => Ok(ErrorCode::$variant),)*
                    code if code >= CUSTOM_ERROR_CODE_BASE => Ok(ErrorCode::Custom(code)),
                    code => Err(MediaError::invalid_argument(format!("invalid error code {}", code))),
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $name,)*
                    ErrorCode::Custom(_) => "custom error code",
                }
            }
        }
    };
}

error_codes! {
    Unspecified = 1000 => "ERROR_CODE_UNSPECIFIED",
    RemoteError = 1001 => "ERROR_CODE_REMOTE_ERROR",
    BehindLiveWindow = 1002 => "ERROR_CODE_BEHIND_LIVE_WINDOW",
    Timeout = 1003 => "ERROR_CODE_TIMEOUT",
    FailedRuntimeCheck = 1004 => "ERROR_CODE_FAILED_RUNTIME_CHECK",
    IoUnspecified = 2000 => "ERROR_CODE_IO_UNSPECIFIED",
    IoNetworkConnectionFailed = 2001 => "ERROR_CODE_IO_NETWORK_CONNECTION_FAILED",
    IoNetworkConnectionTimeout = 2002 => "ERROR_CODE_IO_NETWORK_CONNECTION_TIMEOUT",
    IoInvalidHttpContentType = 2003 => "ERROR_CODE_IO_INVALID_HTTP_CONTENT_TYPE",
    IoBadHttpStatus = 2004 => "ERROR_CODE_IO_BAD_HTTP_STATUS",
    IoFileNotFound = 2005 => "ERROR_CODE_IO_FILE_NOT_FOUND",
    IoNoPermission = 2006 => "ERROR_CODE_IO_NO_PERMISSION",
    IoCleartextNotPermitted = 2007 => "ERROR_CODE_IO_CLEARTEXT_NOT_PERMITTED",
    IoReadPositionOutOfRange = 2008 => "ERROR_CODE_IO_READ_POSITION_OUT_OF_RANGE",
    ParsingContainerMalformed = 3001 => "ERROR_CODE_PARSING_CONTAINER_MALFORMED",
    ParsingManifestMalformed = 3002 => "ERROR_CODE_PARSING_MANIFEST_MALFORMED",
    ParsingContainerUnsupported = 3003 => "ERROR_CODE_PARSING_CONTAINER_UNSUPPORTED",
    ParsingManifestUnsupported = 3004 => "ERROR_CODE_PARSING_MANIFEST_UNSUPPORTED",
    DecoderInitFailed = 4001 => "ERROR_CODE_DECODER_INIT_FAILED",
    DecoderQueryFailed = 4002 => "ERROR_CODE_DECODER_QUERY_FAILED",
    DecodingFailed = 4003 => "ERROR_CODE_DECODING_FAILED",
    DecodingFormatExceedsCapabilities = 4004 => "ERROR_CODE_DECODING_FORMAT_EXCEEDS_CAPABILITIES",
    DecodingFormatUnsupported = 4005 => "ERROR_CODE_DECODING_FORMAT_UNSUPPORTED",
    DecodingResourcesReclaimed = 4006 => "ERROR_CODE_DECODING_RESOURCES_RECLAIMED",
    AudioTrackInitFailed = 5001 => "ERROR_CODE_AUDIO_TRACK_INIT_FAILED",
    AudioTrackWriteFailed = 5002 => "ERROR_CODE_AUDIO_TRACK_WRITE_FAILED",
    AudioTrackOffloadWriteFailed = 5003 => "ERROR_CODE_AUDIO_TRACK_OFFLOAD_WRITE_FAILED",
    AudioTrackOffloadInitFailed = 5004 => "ERROR_CODE_AUDIO_TRACK_OFFLOAD_INIT_FAILED",
    DrmUnspecified = 6000 => "ERROR_CODE_DRM_UNSPECIFIED",
    DrmSchemeUnsupported = 6001 => "ERROR_CODE_DRM_SCHEME_UNSUPPORTED",
    DrmProvisioningFailed = 6002 => "ERROR_CODE_DRM_PROVISIONING_FAILED",
    DrmContentError = 6003 => "ERROR_CODE_DRM_CONTENT_ERROR",
    DrmLicenseAcquisitionFailed = 6004 => "ERROR_CODE_DRM_LICENSE_ACQUISITION_FAILED",
    DrmDisallowedOperation = 6005 => "ERROR_CODE_DRM_DISALLOWED_OPERATION",
    DrmSystemError = 6006 => "ERROR_CODE_DRM_SYSTEM_ERROR",
    DrmDeviceRevoked = 6007 => "ERROR_CODE_DRM_DEVICE_REVOKED",
    DrmLicenseExpired = 6008 => "ERROR_CODE_DRM_LICENSE_EXPIRED",
    VideoFrameProcessorInitFailed = 7000 => "ERROR_CODE_VIDEO_FRAME_PROCESSOR_INIT_FAILED",
    VideoFrameProcessingFailed = 7001 => "ERROR_CODE_VIDEO_FRAME_PROCESSING_FAILED",
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cause rebuilt from a bundle, where only the description survives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteCause(pub String);

/// A failure that stopped playback.
#[derive(Error, Debug, Clone)]
#[error("{}: {}", .error_code, .message.as_deref().unwrap_or("playback error"))]
pub struct PlaybackException {
    pub error_code: ErrorCode,
    /// [`utils::elapsed_realtime_ms`] when the failure was raised; comparable
    /// across processes on the same machine.
    pub timestamp_ms: i64,
    pub message: Option<String>,
    #[source]
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl PlaybackException {
    pub fn new(error_code: ErrorCode, message: Option<String>) -> Self {
        Self {
            error_code,
            timestamp_ms: utils::elapsed_realtime_ms(),
            message,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn error_code_name(&self) -> &'static str {
        self.error_code.name()
    }

    /// Compares everything but the timestamp; causes match by description.
    pub fn error_info_equals(&self, other: &PlaybackException) -> bool {
        self.error_code == other.error_code
            && self.message == other.message
            && self.cause.as_ref().map(|cause| cause.to_string())
                == other.cause.as_ref().map(|cause| cause.to_string())
    }
}

impl PartialEq for PlaybackException {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp_ms == other.timestamp_ms && self.error_info_equals(other)
    }
}

const FIELD_ERROR_CODE: u32 = 0;
const FIELD_TIMESTAMP_MS: u32 = 1;
const FIELD_MESSAGE: u32 = 2;
const FIELD_CAUSE_MESSAGE: u32 = 4;

impl Bundleable for PlaybackException {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_ERROR_CODE), i64::from(self.error_code.code()));
        bundle.put(field_key(FIELD_TIMESTAMP_MS), self.timestamp_ms);
        bundle.put_opt(field_key(FIELD_MESSAGE), self.message.clone());
        bundle.put_opt(
            field_key(FIELD_CAUSE_MESSAGE),
            self.cause.as_ref().map(|cause| cause.to_string()),
        );
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let code = bundle.get_or::<i32>(&field_key(FIELD_ERROR_CODE), ErrorCode::Unspecified.code())?;
        let mut exception = PlaybackException::new(
            ErrorCode::from_code(code)?,
            bundle.get::<String>(&field_key(FIELD_MESSAGE))?,
        );
        if let Some(timestamp_ms) = bundle.get::<i64>(&field_key(FIELD_TIMESTAMP_MS))? {
            exception.timestamp_ms = timestamp_ms;
        }
        if let Some(cause) = bundle.get::<String>(&field_key(FIELD_CAUSE_MESSAGE))? {
            exception = exception.with_cause(RemoteCause(cause));
        }
        Ok(exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_reads_realtime_clock() {
        let before_ms = utils::elapsed_realtime_ms();
        let exception = PlaybackException::new(ErrorCode::Unspecified, None);
        assert!(exception.timestamp_ms >= before_ms);
        assert!(exception.timestamp_ms <= utils::elapsed_realtime_ms());
    }

    #[test]
    fn test_error_code_names() {
        assert_eq!(ErrorCode::IoFileNotFound.code(), 2005);
        assert_eq!(ErrorCode::IoFileNotFound.name(), "ERROR_CODE_IO_FILE_NOT_FOUND");
        assert_eq!(ErrorCode::from_code(6008).unwrap(), ErrorCode::DrmLicenseExpired);
        assert_eq!(ErrorCode::from_code(1_000_005).unwrap(), ErrorCode::Custom(1_000_005));
        assert_eq!(ErrorCode::Custom(1_000_005).name(), "custom error code");
        assert!(ErrorCode::from_code(42).is_err());
    }

    #[test]
    fn test_display_and_source() {
        let exception = PlaybackException::new(ErrorCode::Timeout, Some("took too long".into()))
            .with_cause(RemoteCause("socket closed".into()));
        assert_eq!(exception.to_string(), "ERROR_CODE_TIMEOUT: took too long");
        assert_eq!(exception.source().map(|s| s.to_string()), Some("socket closed".to_string()));

        let bare = PlaybackException::new(ErrorCode::Unspecified, None);
        assert_eq!(bare.to_string(), "ERROR_CODE_UNSPECIFIED: playback error");
        assert!(bare.source().is_none());
    }

    #[test]
    fn test_bundle_keeps_error_info() {
        let exception = PlaybackException::new(ErrorCode::Custom(1_000_001), Some("app".into()))
            .with_cause(RemoteCause("inner".into()))
            .with_timestamp_ms(1234);
        let restored = PlaybackException::from_bundle(&exception.to_bundle()).unwrap();
        assert_eq!(restored, exception);
        assert!(restored.error_info_equals(&exception.clone().with_timestamp_ms(1)));
    }
}
