//! Scoped GDAL configuration options

use crate::types::InsarResult;
use gdal::config;

/// Applies GDAL config options to the current thread until dropped.
///
/// Options are set thread-locally so concurrent callers do not see each
/// other's settings. On drop every option named by the guard is put back
/// to its previous thread-local value, or cleared if it had none. Options
/// changed by other code while the guard is alive are left as they are.
pub struct GdalConfigGuard {
    previous: Vec<(String, Option<String>)>,
}

impl GdalConfigGuard {
    pub fn apply<K, V>(options: &[(K, V)]) -> InsarResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut guard = GdalConfigGuard {
            previous: Vec::with_capacity(options.len()),
        };
        for (key, value) in options {
            let key = key.as_ref();
            let old = config::get_thread_local_config_option(key, "")?;
            let old = if old.is_empty() { None } else { Some(old) };
            // record before setting so a failure part-way still restores
            guard.previous.push((key.to_string(), old));
            config::set_thread_local_config_option(key, value.as_ref())?;
            log::debug!("GDAL option {}={} (thread-local)", key, value.as_ref());
        }
        Ok(guard)
    }
}

impl Drop for GdalConfigGuard {
    fn drop(&mut self) {
        for (key, old) in self.previous.iter().rev() {
            let restored = match old {
                Some(value) => config::set_thread_local_config_option(key, value),
                None => config::clear_thread_local_config_option(key),
            };
            if let Err(e) = restored {
                log::warn!("Failed to restore GDAL option {}: {}", key, e);
            }
        }
    }
}
