// Platform-specific media picker implementation
//
// On Android the system picker is launched through JNI calls into the main
// activity, polling for the result the same way the activity hands back
// capture results. Other platforms return platform errors; the upload
// coordinator treats those as a failed selection.

/// Errors that can occur while picking media
#[derive(Debug, Clone)]
pub enum PickerError {
    PermissionDenied(String),
    Timeout(String),
    Cancelled(String),
    PlatformNotSupported(String),
    Other(String),
}

impl std::fmt::Display for PickerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickerError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            PickerError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            PickerError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            PickerError::PlatformNotSupported(msg) => write!(f, "Platform not supported: {}", msg),
            PickerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PickerError {}

/// Kind of media the picker should offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// Quality hint passed to the platform picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQuality {
    Low,
    Medium,
    High,
}

/// Options for launching the picker
#[derive(Debug, Clone)]
pub struct PickerOptions {
    pub media_type: MediaType,
    pub selection_limit: u32,
    pub quality: MediaQuality,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            media_type: MediaType::Video,
            selection_limit: 1,
            quality: MediaQuality::High,
        }
    }
}

/// One picked asset
#[derive(Debug, Clone, PartialEq)]
pub struct PickedAsset {
    pub uri: String,
}

/// Result of a picker invocation
///
/// Cancellation is not an error; it comes back as a response with
/// `cancelled` set and no assets.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerResponse {
    pub cancelled: bool,
    pub assets: Vec<PickedAsset>,
    pub error_message: Option<String>,
}

impl PickerResponse {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            assets: Vec::new(),
            error_message: None,
        }
    }
}

/// Seam for the external picker so the coordinator can be tested with fakes
#[allow(async_fn_in_trait)]
pub trait MediaPicker {
    async fn launch(&self, options: &PickerOptions) -> Result<PickerResponse, PickerError>;
}

const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";

/// Configuration for the picker on Android
#[derive(Debug, Clone)]
pub struct AndroidPickerConfig {
    /// Fully qualified class name in slash format (e.g. "com/example/app/MainActivity")
    pub main_activity_class: String,
}

impl Default for AndroidPickerConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
        }
    }
}

/// Picker backed by the platform's media picker
#[derive(Debug, Clone, Default)]
pub struct SystemMediaPicker {
    config: AndroidPickerConfig,
}

impl SystemMediaPicker {
    pub fn new(config: AndroidPickerConfig) -> Self {
        Self { config }
    }
}

impl MediaPicker for SystemMediaPicker {
    async fn launch(&self, options: &PickerOptions) -> Result<PickerResponse, PickerError> {
        let config = self.config.clone();
        let options = options.clone();

        // The platform call blocks while polling for the activity result
        let picked = tokio::task::spawn_blocking(move || platform_pick(&config, &options))
            .await
            .map_err(|e| PickerError::Other(format!("Picker task failed: {}", e)))?;

        match picked {
            Ok(uri) => Ok(PickerResponse {
                cancelled: false,
                assets: vec![PickedAsset { uri }],
                error_message: None,
            }),
            Err(PickerError::Cancelled(msg)) => {
                log::debug!("Picker cancelled: {}", msg);
                Ok(PickerResponse::cancelled())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(target_os = "android")]
fn platform_pick(config: &AndroidPickerConfig, options: &PickerOptions) -> Result<String, PickerError> {
    use ndk_context::android_context;

    let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    let vm = unsafe { jni::JavaVM::from_raw(vm_ptr) }
        .map_err(|e| PickerError::Other(format!("JavaVM failed: {}", e)))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| PickerError::Other(format!("JNI attach failed: {}", e)))?;

    let (activity, main_cls) = android::activity_instance(&mut env, &config.main_activity_class)?;

    env.call_static_method(&main_cls, "clearPickerState", "()V", &[])
        .map_err(|e| PickerError::Other(format!("clearPickerState failed: {}", e)))?;

    let method = match options.media_type {
        MediaType::Video => "launchVideoPicker",
        MediaType::Image => "launchImagePicker",
    };
    env.call_method(&activity, method, "()V", &[])
        .map_err(|e| PickerError::PermissionDenied(format!("{} failed: {}", method, e)))?;

    // Poll for the activity result (60 seconds timeout)
    for _ in 0..600 {
        std::thread::sleep(std::time::Duration::from_millis(100));

        if let Some(uri) = android::static_string(&mut env, &main_cls, "getLastMediaUri")? {
            return Ok(uri);
        }
        if let Some(err) = android::static_string(&mut env, &main_cls, "getLastPickerError")? {
            return Err(PickerError::Other(err));
        }
        let cancelled = env
            .call_static_method(&main_cls, "wasPickerCancelled", "()Z", &[])
            .and_then(|v| v.z())
            .unwrap_or(false);
        if cancelled {
            return Err(PickerError::Cancelled("No selection made".to_string()));
        }
    }

    Err(PickerError::Timeout(
        "Media picker timeout - no selection made".to_string(),
    ))
}

#[cfg(not(target_os = "android"))]
fn platform_pick(
    _config: &AndroidPickerConfig,
    _options: &PickerOptions,
) -> Result<String, PickerError> {
    Err(PickerError::PlatformNotSupported(
        "Media picker not available on this platform".to_string(),
    ))
}

#[cfg(target_os = "android")]
pub(crate) mod android {
    use super::PickerError;
    use jni::objects::{JClass, JObject, JString, JValue};

    /// Resolve the main activity instance via the application class loader
    pub fn activity_instance<'a>(
        env: &mut jni::JNIEnv<'a>,
        main_activity_class: &str,
    ) -> Result<(JObject<'a>, JClass<'a>), PickerError> {
        let at_cls = env
            .find_class("android/app/ActivityThread")
            .map_err(|e| PickerError::Other(format!("ActivityThread not found: {}", e)))?;
        let at = env
            .call_static_method(
                &at_cls,
                "currentActivityThread",
                "()Landroid/app/ActivityThread;",
                &[],
            )
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("currentActivityThread failed: {}", e)))?;
        let app = env
            .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("getApplication failed: {}", e)))?;
        let loader = env
            .call_method(&app, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("getClassLoader failed: {}", e)))?;

        let fq_dot = main_activity_class.replace('/', ".");
        let name: JString = env
            .new_string(fq_dot)
            .map_err(|e| PickerError::Other(format!("new_string failed: {}", e)))?;
        let cls_obj = env
            .call_method(
                &loader,
                "loadClass",
                "(Ljava/lang/String;)Ljava/lang/Class;",
                &[JValue::Object(&JObject::from(name))],
            )
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("loadClass failed: {}", e)))?;
        let cls = JClass::from(cls_obj);

        let signature = format!("()L{};", main_activity_class);
        let instance = env
            .call_static_method(&cls, "getInstance", &signature, &[])
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("getInstance failed: {}", e)))?;
        if instance.is_null() {
            return Err(PickerError::Other(
                "MainActivity instance is null - activity not initialized?".to_string(),
            ));
        }

        Ok((instance, cls))
    }

    /// Call a static String-returning method; None while the result is pending
    pub fn static_string(
        env: &mut jni::JNIEnv<'_>,
        cls: &JClass<'_>,
        method: &str,
    ) -> Result<Option<String>, PickerError> {
        let result = env
            .call_static_method(cls, method, "()Ljava/lang/String;", &[])
            .and_then(|v| v.l())
            .map_err(|e| PickerError::Other(format!("{} failed: {}", method, e)))?;
        if result.is_null() {
            return Ok(None);
        }
        let value: String = env
            .get_string((&result).into())
            .map_err(|e| PickerError::Other(format!("String conversion failed: {}", e)))?
            .into();
        Ok(Some(value))
    }
}
