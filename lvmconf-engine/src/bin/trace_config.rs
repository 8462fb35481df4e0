/// Config Tracer - Shows the flow through Lexer → Parser → Tree → Writer
///
/// Usage: cargo run --bin trace_config <config-file> [--json]
///
/// Set RUST_LOG=debug to see the engine's own tracing events.

use lvmconf_engine::{ConfigFile, Lexer};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin trace_config <config-file> [--json]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_config /etc/lvm/lvm.conf");
        std::process::exit(1);
    }

    let path = &args[1];
    let json = args.iter().skip(2).any(|a| a == "--json");

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ CONFIG PARSER TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("📝 INPUT:");
    println!("{}", content);
    println!();

    // Step 1: Tokens
    println!("🔤 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in Lexer::new(&content).tokenize() {
        println!("{:>5}  {:<12} {:?}", token.span.line, token.kind.to_string(), token.text);
    }
    println!();

    // Step 2: Tree
    let file = match ConfigFile::read(path) {
        Ok(file) => file,
        Err(e) => {
            println!("❌ {}", e);
            std::process::exit(2);
        }
    };
    let tree = file.tree();

    println!("🌳 TREE:");
    println!("─────────────────────────────────────────────────────────────");
    if json {
        match serde_json::to_string_pretty(tree) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("❌ JSON encoding failed: {}", e),
        }
    } else {
        for root in tree.roots() {
            println!("{:#?}", root);
        }
    }
    let stats = tree.arena_stats();
    println!(
        "arena: {} nodes, {} values, {} string bytes",
        stats.nodes, stats.values, stats.string_bytes
    );
    println!();

    // Step 3: Round-trip
    println!("🔄 ROUND-TRIP TEST:");
    println!("─────────────────────────────────────────────────────────────");
    let canonical = tree.to_string();
    println!("{}", canonical);

    match lvmconf_engine::parse(&canonical) {
        Ok(reparsed) if &reparsed == tree => println!("✅ Round trip is structurally equal"),
        Ok(_) => println!("⚠️  Round trip changed the tree"),
        Err(e) => println!("❌ Re-parse failed: {}", e),
    }
}
