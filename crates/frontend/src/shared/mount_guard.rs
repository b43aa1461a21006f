use leptos::prelude::on_cleanup;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Флаг «компонент ещё смонтирован».
///
/// Асинхронные задачи проверяют его перед записью в сигналы: ответ,
/// пришедший после закрытия страницы или модального окна, отбрасывается.
#[derive(Clone, Debug)]
pub struct MountGuard {
    mounted: Arc<AtomicBool>,
}

impl MountGuard {
    /// Создать флаг, который сбрасывается при очистке текущего владельца
    pub fn new() -> Self {
        let guard = Self::detached();
        let flag = guard.mounted.clone();
        on_cleanup(move || flag.store(false, Ordering::Relaxed));
        guard
    }

    /// Флаг без привязки к реактивному владельцу
    pub fn detached() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Relaxed)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Relaxed);
    }

    /// Выполнить `f`, только если компонент ещё жив
    pub fn run<F: FnOnce()>(&self, f: F) -> bool {
        if self.is_mounted() {
            f();
            true
        } else {
            false
        }
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_late_result_is_dropped_after_unmount() {
        let guard = MountGuard::detached();
        let writes = Cell::new(0);

        assert!(guard.run(|| writes.set(writes.get() + 1)));

        let shared = guard.clone();
        guard.unmount();
        assert!(!shared.is_mounted());
        assert!(!shared.run(|| writes.set(writes.get() + 1)));
        assert_eq!(writes.get(), 1);
    }
}
