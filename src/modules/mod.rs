pub mod bookings;

use booking_kernel::settings::Settings;
use booking_kernel::ModuleRegistry;

use bookings::store::SharedStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore, settings: &Settings) {
    registry.register_custom(bookings::create_module(store, &settings.bookings));
}
