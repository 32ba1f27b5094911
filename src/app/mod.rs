
use std::collections::HashSet;

use anyhow::Result;
use rand::Rng;

use crate::cache::CatalogCache;
use crate::catalog;
use crate::cli::{Cli, Command};
use crate::db::Database;
use crate::models::Episode;
use crate::paths::database_file_path;

pub(crate) const CATALOG_CACHE_KEY: &str = "episodes";

/// Outcome of one suggestion cycle.
#[derive(Debug, PartialEq)]
pub(crate) enum Suggestion {
    Episode(Episode),
    /// Every catalog episode has already been suggested; nothing was
    /// selected and nothing was written.
    Exhausted,
}

pub fn run(cli: Cli) -> Result<()> {
    let db = open_db()?;

    match cli.command {
        Some(Command::Suggest) | None => run_suggest(&db),
        Some(Command::Watched) => run_watched(&db),
        Some(Command::Reset) => run_reset(&db),
    }
}

fn run_suggest(db: &Database) -> Result<()> {
    let suggestion = suggest_episode(db, || catalog::fetch_catalog(catalog::DEFAULT_ENDPOINT))?;
    match suggestion {
        Suggestion::Episode(episode) => println!(
            "Suggested episode: {} (S{} E{})",
            episode.name, episode.season, episode.number
        ),
        Suggestion::Exhausted => {
            println!("You have watched every episode! Run `episuggest reset` to start over.");
        }
    }
    Ok(())
}

fn run_watched(db: &Database) -> Result<()> {
    let mut ids = db.watched_ids()?;
    if ids.is_empty() {
        println!("No episodes suggested yet.");
        return Ok(());
    }
    ids.sort_unstable();
    for id in &ids {
        println!("{id}");
    }
    println!("{} episode(s) suggested so far.", ids.len());
    Ok(())
}

fn run_reset(db: &Database) -> Result<()> {
    let cleared = db.reset_watched()?;
    println!("Forgot {cleared} suggested episode(s).");
    Ok(())
}

fn open_db() -> Result<Database> {
    let db_path = database_file_path()?;
    let db = Database::open(&db_path)?;
    db.migrate()?;
    Ok(db)
}

/// One full suggestion cycle: catalog via cache-or-fetch, filter out
/// watched ids, pick uniformly at random, record the pick. The watched
/// set is only written after a successful selection; any earlier
/// failure leaves it untouched.
pub(crate) fn suggest_episode<F>(db: &Database, fetch: F) -> Result<Suggestion>
where
    F: FnOnce() -> Result<Vec<Episode>>,
{
    let all_episodes = obtain_catalog(db, fetch)?;
    let watched = db.watched_ids()?;

    let mut unwatched = filter_unwatched(all_episodes, &watched);
    if unwatched.is_empty() {
        return Ok(Suggestion::Exhausted);
    }

    let index = rand::thread_rng().gen_range(0..unwatched.len());
    let episode = unwatched.swap_remove(index);
    db.mark_watched(episode.id)?;
    Ok(Suggestion::Episode(episode))
}

/// Returns the catalog from the cache when fresh, otherwise pulls it
/// through `fetch` and writes the result back before returning. Stale
/// means refetch; there is no fallback to an expired entry.
pub(crate) fn obtain_catalog<F>(db: &Database, fetch: F) -> Result<Vec<Episode>>
where
    F: FnOnce() -> Result<Vec<Episode>>,
{
    let cache = CatalogCache::new(db);
    if let Some(episodes) = cache.read(CATALOG_CACHE_KEY)? {
        return Ok(episodes);
    }

    let episodes = fetch()?;
    cache.write(CATALOG_CACHE_KEY, &episodes)?;
    Ok(episodes)
}

/// Keeps the episodes whose id is not in `watched`, preserving the
/// catalog's relative order.
pub(crate) fn filter_unwatched(all_episodes: Vec<Episode>, watched: &[i64]) -> Vec<Episode> {
    let watched: HashSet<i64> = watched.iter().copied().collect();
    all_episodes
        .into_iter()
        .filter(|episode| !watched.contains(&episode.id))
        .collect()
}
