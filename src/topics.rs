//! Topic store listing for `papers topics`.

use anyhow::Result;

use crate::store::PaperStore;

pub fn run_topics(store: &PaperStore) -> Result<()> {
    let topics = store.topics()?;
    if topics.is_empty() {
        println!("No topic stores under {}.", store.root().display());
        return Ok(());
    }

    println!("{:<32} {:<12} {:>6}  NOTES", "TOPIC", "STATUS", "PAPERS");
    for t in &topics {
        println!(
            "{:<32} {:<12} {:>6}  {}",
            t.topic,
            t.status,
            t.papers,
            t.notes.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
