use std::path::PathBuf;

#[cfg(target_os = "android")]
use crate::error::AppError;

/// Returns the path to the gallery database
pub fn get_database_path() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        android_files_dir()
            .unwrap_or_else(|_| PathBuf::from("/data/local/tmp/clipshelf"))
            .join("clipshelf.db")
    }

    #[cfg(not(target_os = "android"))]
    {
        PathBuf::from("./data/clipshelf.db")
    }
}

#[cfg(target_os = "android")]
fn android_files_dir() -> Result<PathBuf, AppError> {
    use jni::objects::JObject;
    use jni::JavaVM;
    use ndk_context::android_context;

    let vm_ptr = android_context().vm() as *mut jni::sys::JavaVM;
    let vm = unsafe { JavaVM::from_raw(vm_ptr) }
        .map_err(|e| AppError::Other(format!("JavaVM creation failed: {}", e)))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| AppError::Other(format!("Failed to attach thread: {}", e)))?;

    let context_ptr = android_context().context();
    let context = unsafe { JObject::from_raw(context_ptr as jni::sys::jobject) };

    let files_dir = env
        .call_method(&context, "getFilesDir", "()Ljava/io/File;", &[])
        .and_then(|v| v.l())
        .map_err(|e| AppError::Other(format!("getFilesDir failed: {}", e)))?;
    let path_obj = env
        .call_method(&files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .map_err(|e| AppError::Other(format!("getAbsolutePath failed: {}", e)))?;
    let path: String = env
        .get_string((&path_obj).into())
        .map_err(|e| AppError::Other(format!("String conversion failed: {}", e)))?
        .into();

    Ok(PathBuf::from(path))
}
