use once_cell::sync::OnceCell;
use rand::Rng;
use shast::{ParseResult, Script, Word};
use shast_config::ShastConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once per process. `RUST_LOG` wins over the
/// configured level.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let config = ShastConfig::default();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.directive()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Parse after making sure logging is set up.
pub fn parse(input: &str) -> ParseResult<Script> {
    init_tracing();
    shast::parse(input)
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Every `*.sh` file under the fixtures directory, as `(file name, text)`,
/// sorted by name.
pub fn fixture_scripts() -> Result<Vec<(String, String)>, Box<dyn std::error::Error + Send + Sync>> {
    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(fixtures_dir())? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "sh") {
            let name = path
                .file_name()
                .ok_or("fixture without a file name")?
                .to_string_lossy()
                .into_owned();
            scripts.push((name, std::fs::read_to_string(&path)?));
        }
    }
    scripts.sort();
    tracing::debug!(count = scripts.len(), "loaded fixture scripts");
    Ok(scripts)
}

/// Random word pieces of every flattenable kind.
pub fn random_pieces(len: usize) -> Vec<Word> {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|i| match rng.gen_range(0..4) {
            0 => Word::literal(format!("l{i}")),
            1 => Word::glob(format!("*{i}")),
            2 => Word::variable(format!("v{i}")),
            _ => Word::VariableSubstitution {
                expression: format!("x{i}:-y"),
            },
        })
        .collect()
}

/// Split `pieces` at random points into nested concatenations.
pub fn random_grouping(pieces: &[Word]) -> Vec<Word> {
    let mut rng = rand::thread_rng();
    let mut groups = Vec::new();
    let mut rest = pieces;
    while !rest.is_empty() {
        let take = rng.gen_range(1..=rest.len());
        let (group, tail) = rest.split_at(take);
        groups.push(Word::Concatenation {
            pieces: group.to_vec(),
        });
        rest = tail;
    }
    groups
}
