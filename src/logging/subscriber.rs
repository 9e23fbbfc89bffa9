//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use tracing_subscriber::registry::LookupSpan;

use super::file::LogFile;
use super::utils::{format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dst_install::stage";
/// Target used for dry-run previews.
pub(super) const DRY_RUN_TARGET: &str = "dst_install::dry_run";

/// The `message` of an event or span plus every other field, in the order
/// they were recorded.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl EventFields {
    fn of_event(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    /// ` key=value` for every non-message field.
    fn suffix(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| format!(" {name}={value}"))
            .collect()
    }
}

impl tracing::field::Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }
}

/// Rendered fields of an open span, kept in the span's extensions.
struct SpanFields(String);

/// A [`tracing_subscriber::Layer`] that writes every event to the run's
/// [`LogFile`] with a timestamp and ANSI codes stripped.
///
/// Event fields other than the message (error kind, exit status) and the
/// fields of every enclosing span (task name, resource) are appended as
/// `key=value` pairs, so a failure in the file can be traced back to the
/// step and artifact it happened in.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: LogFile,
}

impl FileLayer {
    pub(super) const fn new(file: LogFile) -> Self {
        Self { file }
    }
}

impl<S> tracing_subscriber::Layer<S> for FileLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = EventFields::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut()
                .insert(SpanFields(strip_ansi(&fields.suffix())));
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let fields = EventFields::of_event(event);
        let msg = strip_ansi(&fields.message);
        let ts = format_utc_time();

        let line = match (*metadata.level(), metadata.target()) {
            // Stage headers are the task names themselves.
            (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
            (level, target) => {
                let tag = match (level, target) {
                    (tracing::Level::INFO, DRY_RUN_TARGET) => "[dry run] ",
                    (tracing::Level::ERROR, _) => "[error] ",
                    (tracing::Level::WARN, _) => "[warn] ",
                    (tracing::Level::DEBUG, _) => "[debug] ",
                    _ => "",
                };
                let mut line = format!("[{ts}]     {tag}{msg}{}", fields.suffix());
                if let Some(scope) = ctx.event_scope(event) {
                    for span in scope.from_root() {
                        if let Some(SpanFields(rendered)) = span.extensions().get::<SpanFields>() {
                            line.push_str(rendered);
                        }
                    }
                }
                line
            }
        };

        self.file.write_line(line);
    }
}

/// Console formatter: `==>` stage headers, indented details, coloured
/// warnings and errors.
///
/// Extra fields on a warning or error are shown dimmed after the message;
/// span context stays in the log file.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let fields = EventFields::of_event(event);
        let msg = &fields.message;

        match *metadata.level() {
            tracing::Level::ERROR => writeln!(
                writer,
                "\x1b[31mERROR\x1b[0m {msg}\x1b[2m{}\x1b[0m",
                fields.suffix()
            ),
            tracing::Level::WARN => writeln!(
                writer,
                "\x1b[33mWARN\x1b[0m  {msg}\x1b[2m{}\x1b[0m",
                fields.suffix()
            ),
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO if metadata.target() == DRY_RUN_TARGET => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stdout (warnings and errors to stderr). Every
/// event down to `debug` is also routed to the returned [`LogFile`] for
/// `$XDG_CACHE_HOME/dst-install/<command>.log`, which buffers until
/// [`LogFile::open`] is called.  Must be called once at program startup,
/// before any logging.
pub fn init_subscriber(verbose: bool, command: &str) -> LogFile {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let log_file = LogFile::new(log_file_path(command));
    let file_layer = FileLayer::new(log_file.clone()).with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    log_file
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    fn capture(f: impl FnOnce()) -> String {
        let tmp = tempfile::tempdir().unwrap();
        let file = LogFile::new(tmp.path().join("install.log"));
        assert!(file.open());
        let layer = FileLayer::new(file.clone()).with_filter(LevelFilter::DEBUG);
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        std::fs::read_to_string(file.path()).unwrap()
    }

    #[test]
    fn file_lines_are_tagged_and_stripped() {
        let contents = capture(|| {
            tracing::info!(target: "dst_install::stage", "Install files");
            tracing::info!(target: "dst_install::dry_run", "would copy x");
            tracing::warn!("\x1b[33mreload failed\x1b[0m");
            tracing::debug!("copied y");
        });
        assert!(contents.contains("==> Install files"), "{contents}");
        assert!(contents.contains("[dry run] would copy x"), "{contents}");
        assert!(contents.contains("[warn] reload failed"), "{contents}");
        assert!(contents.contains("[debug] copied y"), "{contents}");
        assert!(!contents.contains('\x1b'), "{contents}");
    }

    #[test]
    fn event_fields_follow_the_message() {
        let contents = capture(|| {
            tracing::warn!(kind = "reload", exit_status = 2_u8, "daemon-reload failed");
        });
        assert!(
            contents.contains("[warn] daemon-reload failed kind=\"reload\" exit_status=2"),
            "{contents}"
        );
    }

    #[test]
    fn enclosing_spans_name_task_and_resource() {
        let contents = capture(|| {
            let _task = tracing::info_span!("task", task = "Install files").entered();
            tracing::info!(target: "dst_install::stage", "Install files");
            let _resource =
                tracing::debug_span!("resource", resource = "/home/u/.local/bin/dst-tui")
                    .entered();
            tracing::error!("missing source");
        });
        assert!(
            contents.contains(
                "[error] missing source task=\"Install files\" \
                 resource=\"/home/u/.local/bin/dst-tui\""
            ),
            "{contents}"
        );
        let stage = contents.lines().find(|l| l.contains("==>")).unwrap();
        assert!(!stage.contains("task="), "{stage}");
    }

    #[test]
    fn events_outside_spans_carry_no_context() {
        let contents = capture(|| tracing::info!("bundle: /opt/dst"));
        let line = contents.lines().last().unwrap();
        assert!(line.ends_with("     bundle: /opt/dst"), "{line}");
    }
}
