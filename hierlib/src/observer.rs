use crate::address::Address;
use crate::cache::Victim;
use crate::trace::AccessKind;

/// Extension points for watching a simulation without coupling the core to
/// any output format
///
/// Every method has a no-op default, so observers only implement the events
/// they care about. The hierarchy invokes the observer at the fixed points in
/// each access: the access itself, hit or miss, victim selection on install,
/// and a line turning dirty.
pub trait AccessObserver {
    /// A level begins serving a logical access
    fn on_access(&mut self, _level: &str, _kind: AccessKind, _addr: &Address) {}

    /// The access hit in the level
    fn on_hit(&mut self, _level: &str) {}

    /// The access missed in the level
    fn on_miss(&mut self, _level: &str) {}

    /// A fill completed; `victim` is the displaced contents if the set was
    /// full
    fn on_victim(&mut self, _level: &str, _victim: Option<&Victim>) {}

    /// A resident line was marked dirty by a write hit or a dirty fill
    fn on_dirty(&mut self, _level: &str) {}
}

/// The default observer; ignores everything
pub struct NullObserver;

impl AccessObserver for NullObserver {}

/// Prints one line per event to stdout, in the debug trace format
pub struct EventPrinter;

impl AccessObserver for EventPrinter {
    fn on_access(&mut self, level: &str, kind: AccessKind, addr: &Address) {
        println!(
            "{level} {kind} : {:x} (tag {:x}, index {})",
            addr.raw, addr.tag, addr.set_index
        );
    }

    fn on_hit(&mut self, level: &str) {
        println!("{level} hit");
    }

    fn on_miss(&mut self, level: &str) {
        println!("{level} miss");
    }

    fn on_victim(&mut self, level: &str, victim: Option<&Victim>) {
        match victim {
            Some(victim) => {
                let cleanliness = if victim.dirty { "dirty" } else { "clean" };
                println!("{level} victim: {:x} ({cleanliness})", victim.block);
            }
            None => println!("{level} victim: none"),
        }
    }

    fn on_dirty(&mut self, level: &str) {
        println!("{level} set dirty");
    }
}
