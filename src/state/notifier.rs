use tracing::debug;

use crate::types::MarketChange;

type Listener = Box<dyn FnMut(&MarketChange)>;

/// Synchronous, ordered broadcast of market-list changes.
///
/// Listeners run on the caller's thread, in subscription order, once per
/// `notify`. There is no queueing and no retry.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Listener>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&MarketChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&mut self, change: &MarketChange) {
        debug!(
            action = %change.action,
            markets = change.market_ids.len(),
            listeners = self.listeners.len(),
            "Broadcasting market list",
        );
        for listener in self.listeners.iter_mut() {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeAction;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_once_each_in_subscription_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();

        for tag in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            notifier.subscribe(move |change: &MarketChange| {
                calls.borrow_mut().push((tag, change.market_ids.clone()));
            });
        }
        assert_eq!(notifier.listener_count(), 3);

        notifier.notify(&MarketChange {
            action: ChangeAction::Update,
            market_ids: vec!["A".to_string(), "C".to_string()],
        });

        let calls = calls.borrow();
        let tags: Vec<_> = calls.iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, vec!["first", "second", "third"]);
        assert!(calls.iter().all(|(_, ids)| ids == &vec!["A".to_string(), "C".to_string()]));
    }

    #[test]
    fn notify_without_listeners_is_a_no_op() {
        let mut notifier = ChangeNotifier::new();
        notifier.notify(&MarketChange {
            action: ChangeAction::Update,
            market_ids: Vec::new(),
        });
        assert_eq!(notifier.listener_count(), 0);
    }
}
