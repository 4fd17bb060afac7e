//! Vault Legend - Entry Point
//!
//! Scans a notes vault, forges enemies and quizzes from it, and runs a
//! line-based forest fight in the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vault_legend::analysis::ContentAnalyzer;
use vault_legend::combat::{ClassArchetype, CombatAction, Player};
use vault_legend::core::config::GameConfig;
use vault_legend::core::error::{Result, VaultError};
use vault_legend::forge::EnemyForge;
use vault_legend::llm::{GenerativeBackend, GenerativeClient, ScriptedBackend};
use vault_legend::quiz::QuizEngine;
use vault_legend::session::{GameSession, InMemoryCharacterStore, SessionError};
use vault_legend::vault::VaultScanner;

#[derive(Parser, Debug)]
#[command(name = "vault-legend")]
#[command(about = "Fight the forgotten knowledge lurking in your notes")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault root (overrides the config and auto-discovery)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// Canned generative replies, separated by lines of `---`
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Seed for deterministic runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the notes in the vault with their difficulty
    Scan,
    /// Forge enemies for a level
    Forge {
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Write a quiz question for a note
    Quiz {
        /// Note title (case-insensitive); a random note when omitted
        #[arg(long)]
        note: Option<String>,
    },
    /// Play in the forest
    Play {
        #[arg(long, default_value = "Wanderer")]
        name: String,
        /// knight, mystic or thief
        #[arg(long, default_value = "knight")]
        class: String,
    },
}

#[derive(Serialize)]
struct NoteSummary<'a> {
    title: &'a str,
    path: String,
    age_days: u32,
    difficulty: u8,
    domain: String,
    tags: Vec<&'a str>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vault_legend=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(root) = &cli.vault {
        config.vault.root = Some(root.clone());
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let client = Arc::new(build_client(&cli, &config)?);
    client.initialize();
    let seed = config.seed.unwrap_or_else(rand::random);

    match cli.command {
        Command::Scan => scan(&config, cli.json),
        Command::Forge { level, count } => {
            let mut scanner = scanner_for(&config);
            let notes = scanner.scan(true);
            let mut forge = EnemyForge::new(client, &config, seed);
            let enemies: Vec<_> = (0..count)
                .map(|_| forge.generate_for_level(notes, level))
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&enemies)?);
            } else {
                for enemy in &enemies {
                    println!("== {} (level {}) ==", enemy.name, enemy.level);
                    println!("HP {}  Attack {}  Gold {}", enemy.hitpoints, enemy.attack, enemy.gold_reward);
                    println!("Wields {}, wears {}", enemy.weapon, enemy.armor);
                    if let Some(title) = enemy.title() {
                        println!("Born of: {}", title);
                    }
                    println!("{}\n", enemy.encounter_narrative);
                }
            }
            Ok(())
        }
        Command::Quiz { note } => {
            let mut scanner = scanner_for(&config);
            let notes = scanner.scan(true);
            let chosen = match &note {
                Some(title) => notes
                    .iter()
                    .find(|n| n.title.eq_ignore_ascii_case(title)),
                None => {
                    use rand::seq::SliceRandom;
                    use rand::SeedableRng;
                    notes.choose(&mut rand_chacha::ChaCha8Rng::seed_from_u64(seed))
                }
            };
            let Some(chosen) = chosen else {
                return Err(VaultError::Config("no matching note in the vault".into()));
            };

            let mut engine = QuizEngine::new(client, &config, seed);
            let question = engine.generate(&chosen.to_ref(), chosen.difficulty_level());
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&question)?);
            } else {
                println!("[{}] {}", chosen.title, question.question);
                println!("Answer: {}", question.answer);
            }
            Ok(())
        }
        Command::Play { name, class } => {
            let class = ClassArchetype::parse(&class).ok_or_else(|| {
                VaultError::Config(format!("unknown class '{}', use knight, mystic or thief", class))
            })?;
            let player = Player::with_limits(name, class, &config.combat);
            let session = GameSession::new(config, player, client);
            play(session)
        }
    }
}

fn build_client(cli: &Cli, config: &GameConfig) -> Result<GenerativeClient> {
    if let Some(path) = &cli.script {
        let text = std::fs::read_to_string(path)?;
        let backend: Arc<dyn GenerativeBackend> = Arc::new(ScriptedBackend::from_script(&text));
        return Ok(GenerativeClient::with_backend(backend, config.call_timeout()));
    }
    if config.generation.enabled {
        Ok(GenerativeClient::from_env(config.call_timeout()))
    } else {
        Ok(GenerativeClient::disabled())
    }
}

fn scanner_for(config: &GameConfig) -> VaultScanner {
    let mut scanner = VaultScanner::new(&config.vault);
    if scanner.root().is_none() {
        if let Some(found) = VaultScanner::discover() {
            scanner.set_root(found);
        }
    }
    scanner
}

fn scan(config: &GameConfig, json: bool) -> Result<()> {
    let mut scanner = scanner_for(config);
    let analyzer = ContentAnalyzer::new();
    let notes = scanner.scan(true);

    let summaries: Vec<_> = notes
        .iter()
        .map(|note| NoteSummary {
            title: &note.title,
            path: note.path.display().to_string(),
            age_days: note.age_days(),
            difficulty: note.difficulty_level(),
            domain: analyzer.analyze(&note.to_ref()).domain.to_string(),
            tags: note.tags.iter().map(String::as_str).collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{} notes", summaries.len());
    for s in &summaries {
        println!("  [{:>2}] {:<40} {:>5}d  {}", s.difficulty, s.title, s.age_days, s.domain);
    }
    Ok(())
}

fn play(mut session: GameSession) -> Result<()> {
    let store = InMemoryCharacterStore::new();
    let notes = session.refresh_vault(true);

    println!("\n=== VAULT LEGEND ===");
    println!("{} notes stir in the forest.", notes);
    println!();
    println!("Commands:");
    println!("  l / look    - Look for something to kill");
    println!("  a / attack  - Attack");
    println!("  s / skill   - Use your class skill");
    println!("  q / quiz    - Answer a question about the enemy's note (2x damage)");
    println!("  r / run     - Run away");
    println!("  stats       - Show your character");
    println!("  quit        - Leave the forest");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let input = line?.trim().to_lowercase();

        match input.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "stats" => {
                let p = session.player();
                println!(
                    "{} the {} - level {}, HP {}/{}, attack {}, defense {}, gold {}, exp {}, fights left {}",
                    p.name,
                    p.class.display_name(),
                    p.level,
                    p.hitpoints,
                    p.max_hitpoints,
                    p.attack_power,
                    p.defense_power,
                    p.gold,
                    p.experience,
                    p.forest_fights
                );
            }
            "l" | "look" => match session.start_encounter() {
                Ok(enemy) => {
                    println!("{}", enemy.encounter_narrative);
                    println!("**{}** (HP {}, attack {})", enemy.name, enemy.hitpoints, enemy.attack);
                }
                Err(e) => println!("{}", e),
            },
            "a" | "attack" => act(&mut session, &store, CombatAction::Attack)?,
            "s" | "skill" => act(&mut session, &store, CombatAction::Skill)?,
            "r" | "run" => act(&mut session, &store, CombatAction::Flee)?,
            "q" | "quiz" => {
                let prompt = match session.begin_quiz() {
                    Ok(question) => question.question.clone(),
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                println!("{}", prompt);
                print!("answer> ");
                io::stdout().flush()?;
                let answer = match lines.next() {
                    Some(line) => line?,
                    None => break,
                };
                act(&mut session, &store, CombatAction::Quiz { answer })?;
            }
            other => println!("Unknown command '{}'", other),
        }
        session.maintenance();
    }

    println!("\nFarewell, {}. {} kills today.", session.player().name, session.player().total_kills);
    Ok(())
}

fn act(session: &mut GameSession, store: &InMemoryCharacterStore, action: CombatAction) -> Result<()> {
    match session.apply_action(action) {
        Ok(result) => {
            println!("{}", result.message);
            if result.phase.is_terminal() {
                session
                    .finish_encounter(store)
                    .map_err(|e| VaultError::Store(e.to_string()))?;
            } else {
                let enemy = session.encounter().map(|e| e.enemy());
                if let Some(enemy) = enemy {
                    println!(
                        "You: {} HP | {}: {} HP",
                        session.player().hitpoints,
                        enemy.name,
                        enemy.hitpoints
                    );
                }
            }
        }
        Err(SessionError::NoEncounter) => println!("There is nothing here to fight. Try 'look'."),
        Err(e) => println!("{}", e),
    }
    Ok(())
}
