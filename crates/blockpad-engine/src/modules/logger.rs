use std::cell::Cell;
use std::rc::Rc;

use crate::context::EditorContext;
use crate::events::{EditorEvent, EventKind, LogLevel, SubscriptionSet};

use super::{Module, ModuleName};

/// Forwards `Log` events from the bus to the `log` facade, filtered by the
/// configured level. First to start and last to stop, so it sees what
/// every other module reports.
#[derive(Debug, Default)]
pub struct LoggerModule {
    forwarded: Rc<Cell<usize>>,
    subscriptions: SubscriptionSet,
}

impl Module for LoggerModule {
    fn name(&self) -> ModuleName {
        ModuleName::Logger
    }

    fn on_init(&mut self, ctx: &mut EditorContext) {
        let threshold = ctx.settings.log_level;
        let forwarded = self.forwarded.clone();

        let id = ctx.bus.subscribe(EventKind::Log, move |event| {
            let EditorEvent::Log { level, message } = event else {
                return;
            };
            if !threshold.allows(*level) {
                return;
            }
            match level {
                LogLevel::Error => log::error!("{message}"),
                LogLevel::Warning => log::warn!("{message}"),
                LogLevel::Info => log::info!("{message}"),
                LogLevel::None => return,
            }
            forwarded.set(forwarded.get() + 1);
        });
        self.subscriptions.add(id);
    }

    fn on_destroy(&mut self, ctx: &mut EditorContext) {
        self.subscriptions.unsubscribe_all(&ctx.bus);
    }
}

impl LoggerModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events passed on to the `log` facade
    pub fn forwarded(&self) -> usize {
        self.forwarded.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;
    use rstest::rstest;

    #[rstest]
    #[case(LogLevel::None, 0)]
    #[case(LogLevel::Error, 1)]
    #[case(LogLevel::Warning, 2)]
    #[case(LogLevel::Info, 3)]
    fn test_level_filter(#[case] threshold: LogLevel, #[case] expected: usize) {
        let settings = EditorSettings {
            log_level: threshold,
            ..EditorSettings::default()
        };
        let mut ctx = EditorContext::new(settings, Vec::new());
        let mut logger = LoggerModule::new();
        logger.on_init(&mut ctx);

        ctx.bus.error("boom");
        ctx.bus.warning("careful");
        ctx.bus.info("fyi");

        assert_eq!(logger.forwarded(), expected);
    }

    #[test]
    fn test_destroy_stops_forwarding() {
        let mut ctx = EditorContext::new(EditorSettings::default(), Vec::new());
        let mut logger = LoggerModule::new();
        logger.on_init(&mut ctx);
        logger.on_destroy(&mut ctx);

        ctx.bus.error("after teardown");
        assert_eq!(logger.forwarded(), 0);
        assert_eq!(ctx.bus.subscriber_count(), 0);
    }
}
