#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod error;
mod events;
mod pager;
mod pager_options;
mod paginator;
#[cfg(feature = "leptos")]
mod reactive;
mod state;
mod subscriptions;
mod utils;

pub use error::*;
pub use events::{PageEvent, PageEventVariant};
pub use pager::*;
pub use pager_options::*;
pub use paginator::*;
#[cfg(feature = "leptos")]
pub use reactive::*;
pub use state::*;
pub use subscriptions::SubscriptionId;

#[cfg(test)]
mod test {
    use std::sync::Once;
    use std::time::Duration;

    /// Spawns a background thread that panics on any parking_lot deadlock, so a hung test fails loudly.
    pub fn identify_parking_lot_deadlocks() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            std::thread::spawn(|| {
                loop {
                    std::thread::sleep(Duration::from_secs(1));
                    let deadlocks = parking_lot::deadlock::check_deadlock();
                    if deadlocks.is_empty() {
                        continue;
                    }

                    println!("{} deadlocks detected", deadlocks.len());
                    for (i, threads) in deadlocks.iter().enumerate() {
                        println!("Deadlock #{i}");
                        for t in threads {
                            println!("Thread Id {:#?}", t.thread_id());
                            println!("{:#?}", t.backtrace());
                        }
                    }
                    panic!("parking_lot deadlock detected");
                }
            });
        });
    }
}
