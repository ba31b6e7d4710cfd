//! Plinko Drop entry point
//!
//! Native: surveys the default board headlessly, prints the outcome table as
//! JSON, then replays one offset per bucket through a `DropEngine` to check
//! every recorded offset lands where the survey said.
//!
//! Usage: `plinko-drop [samples] [seed]`
//!
//! On wasm32 the library's `PlinkoBoard` export is the entry point.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use plinko_drop::renderer::RecordingCanvas;
    use plinko_drop::sim::{Board, outcomes, pad};
    use plinko_drop::{DropEngine, EngineConfig};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let samples = args.next().and_then(|s| s.parse().ok()).unwrap_or(500usize);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed_u64);

    let config = EngineConfig::default();
    let board = Board::new(&config.board);
    let span = board.drop_span();
    let range = pad(span.start)..pad(span.end);

    log::info!(
        "Surveying {} drops over offsets {}..{} (seed {:#x})",
        samples,
        range.start,
        range.end,
        seed
    );
    let table = outcomes::survey(&board, &config.physics, range, samples, seed);

    match serde_json::to_string_pretty(&table) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialise outcome table: {}", e),
    }
    for (bucket, pct) in table.frequencies().iter().enumerate() {
        log::info!("bucket {:>2}: {:5.1}%", bucket, pct);
    }

    // Replay one recorded offset per bucket through the full engine
    let canvas = RecordingCanvas::new(board.width as u32, board.height as u32);
    let mut engine = match DropEngine::new(canvas, config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Engine setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut expected = Vec::new();
    for bucket in 0..table.offsets.len() {
        if let Some(offset) = table.offset_for(bucket) {
            match engine.start(Some(offset)) {
                Ok(id) => expected.push((id, bucket)),
                Err(e) => log::warn!("Could not replay bucket {}: {}", bucket, e),
            }
        }
    }

    let mut mismatches = 0;
    for _ in 0..outcomes::DEFAULT_MAX_TICKS {
        if engine.tokens().is_empty() {
            break;
        }
        let landings = match engine.step() {
            Ok(landings) => landings,
            Err(e) => {
                log::error!("Replay stopped: {}", e);
                std::process::exit(1);
            }
        };
        for landing in landings {
            let want = expected
                .iter()
                .find(|(id, _)| *id == landing.token_id)
                .map(|(_, bucket)| *bucket);
            if want == Some(landing.bucket) {
                log::info!(
                    "Replay: offset {} -> bucket {} ({} ticks)",
                    landing.offset,
                    landing.bucket,
                    landing.ticks
                );
            } else {
                mismatches += 1;
                log::warn!(
                    "Replay mismatch: offset {} landed in {} (survey said {:?})",
                    landing.offset,
                    landing.bucket,
                    want
                );
            }
        }
    }

    log::info!(
        "Replayed {} drops over {} frames, {} mismatches",
        expected.len(),
        engine.frames(),
        mismatches
    );
    if mismatches > 0 {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `PlinkoBoard`
}
