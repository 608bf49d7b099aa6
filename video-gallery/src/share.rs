// Sharing a committed video through the platform share sheet
//
// On Android this fires a send intent via the main activity. User
// cancellation of the share sheet is logged and swallowed; only real
// platform failures are surfaced.

/// Errors that can occur while sharing
#[derive(Debug, Clone)]
pub enum ShareError {
    Cancelled(String),
    PlatformNotSupported(String),
    Other(String),
}

impl std::fmt::Display for ShareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            ShareError::PlatformNotSupported(msg) => write!(f, "Platform not supported: {}", msg),
            ShareError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ShareError {}

/// What to hand to the platform share sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    /// MIME type hint, e.g. "video/*"
    pub mime_type: String,
    pub url: String,
}

/// Open the platform share sheet for `request`
///
/// Cancellation is not an error: it is logged and reported as success.
pub async fn share_media(request: &ShareRequest) -> Result<(), ShareError> {
    let request = request.clone();
    let result = tokio::task::spawn_blocking(move || platform_share(&request))
        .await
        .map_err(|e| ShareError::Other(format!("Share task failed: {}", e)))?;

    match result {
        Ok(()) => Ok(()),
        Err(ShareError::Cancelled(msg)) => {
            log::debug!("Share cancelled: {}", msg);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(target_os = "android")]
fn platform_share(request: &ShareRequest) -> Result<(), ShareError> {
    use crate::picker::AndroidPickerConfig;
    use jni::objects::JValue;
    use ndk_context::android_context;

    let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    let vm = unsafe { jni::JavaVM::from_raw(vm_ptr) }
        .map_err(|e| ShareError::Other(format!("JavaVM failed: {}", e)))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| ShareError::Other(format!("JNI attach failed: {}", e)))?;

    let config = AndroidPickerConfig::default();
    let (activity, _cls) =
        crate::picker::android::activity_instance(&mut env, &config.main_activity_class)
            .map_err(|e| ShareError::Other(e.to_string()))?;

    let url = env
        .new_string(&request.url)
        .map_err(|e| ShareError::Other(format!("new_string failed: {}", e)))?;
    let mime = env
        .new_string(&request.mime_type)
        .map_err(|e| ShareError::Other(format!("new_string failed: {}", e)))?;

    env.call_method(
        &activity,
        "shareMedia",
        "(Ljava/lang/String;Ljava/lang/String;)V",
        &[JValue::Object(&url), JValue::Object(&mime)],
    )
    .map_err(|e| ShareError::Other(format!("shareMedia failed: {}", e)))?;

    Ok(())
}

#[cfg(not(target_os = "android"))]
fn platform_share(_request: &ShareRequest) -> Result<(), ShareError> {
    Err(ShareError::PlatformNotSupported(
        "Sharing not available on this platform".to_string(),
    ))
}
