//! Wasteland - run seeded rule scenarios against a catalog
//!
//! `roll` repeats a skill or attribute check, `skirmish` pits an armed
//! wanderer against a band of raiders, `rest` lets a character wait out the
//! clock in a (possibly irradiated) campaign.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use wasteland_rules::combat::{burst, fight, BurstTarget, FightRequest};
use wasteland_rules::core::types::{ItemId, LootTemplateId, HOUR};
use wasteland_rules::items::{equip, reload, Equipment};
use wasteland_rules::rolls::{roll, RollStats};
use wasteland_rules::stats::{Race, Special, StatId};
use wasteland_rules::{
    Campaign, Catalog, Character, FightHistory, FightStatus, Result, RollHistory, RulesConfig,
    RulesContext, SeededDice, TurnReport,
};

const PISTOL: ItemId = ItemId(1);
const ROUNDS: ItemId = ItemId(2);
const KNIFE: ItemId = ItemId(3);
const SMG: ItemId = ItemId(4);
const LEATHER_ARMOR: ItemId = ItemId(20);
const RAIDER_STASH: LootTemplateId = LootTemplateId(1);

/// Wasteland rules runner
#[derive(Parser, Debug)]
#[command(name = "wasteland")]
#[command(about = "Run seeded character and combat scenarios on a rules catalog")]
struct Args {
    /// Catalog of items, effects and loot templates
    #[arg(long, default_value = "data/catalog.toml")]
    catalog: PathBuf,

    /// Rules configuration overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a stat check several times
    Roll {
        /// Stat code, e.g. small_guns or luck
        #[arg(long, default_value = "small_guns")]
        stat: String,

        /// Situational modifier added to the stat
        #[arg(long, default_value_t = 0)]
        modifier: i64,

        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    /// An armed wanderer against a band of raiders
    Skirmish {
        #[arg(long, default_value_t = 3)]
        raiders: usize,

        /// Distance the wanderer shoots from
        #[arg(long, default_value_t = 5)]
        range: i64,

        /// Carry an SMG and fire bursts
        #[arg(long)]
        burst: bool,

        /// Rounds before the fight is called off
        #[arg(long, default_value_t = 30)]
        max_rounds: u32,
    },
    /// Wait out the clock in a campaign
    Rest {
        #[arg(long, default_value_t = 8)]
        hours: i64,

        /// Ambient radiation absorbed per hour
        #[arg(long, default_value_t = 0.0)]
        radiation: f64,
    },
}

#[derive(Serialize)]
struct RollReport {
    seed: u64,
    stat: StatId,
    success_rate: f64,
    rolls: Vec<RollHistory>,
}

#[derive(Serialize)]
struct SkirmishReport {
    seed: u64,
    winner: Option<String>,
    rounds: u32,
    wanderer_health: i64,
    raiders_down: usize,
    loot_piles: usize,
    fights: Vec<FightHistory>,
}

#[derive(Serialize)]
struct RestReport {
    seed: u64,
    hours: i64,
    health: i64,
    rads: f64,
    thirst: f64,
    hunger: f64,
    sleep: f64,
    turns: Vec<TurnReport>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wasteland_rules=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut dice = SeededDice::new(seed);
    let config = match &args.config {
        Some(path) => RulesConfig::from_toml_str(&fs::read_to_string(path)?)?,
        None => RulesConfig::default(),
    };
    let catalog = Catalog::load(&args.catalog)?;
    tracing::info!(seed, catalog = %args.catalog.display(), "rules loaded");
    let json = args.format == "json";

    match args.command {
        Command::Roll {
            stat,
            modifier,
            count,
        } => {
            let stat: StatId = stat.parse()?;
            let report = roll_scenario(&config, &catalog, stat, modifier, count, seed, &mut dice)?;
            if json {
                print_json(&report);
            } else {
                for history in &report.rolls {
                    println!(
                        "{:>4} vs {:>3}{:+}  {}",
                        history.roll,
                        history.value,
                        history.modifier,
                        history.label()
                    );
                }
                println!("{}: {:.0}% success", report.stat, report.success_rate * 100.0);
            }
        }
        Command::Skirmish {
            raiders,
            range,
            burst,
            max_rounds,
        } => {
            let report = skirmish(&config, &catalog, raiders, range, burst, max_rounds, seed, &mut dice)?;
            if json {
                print_json(&report);
            } else {
                for history in &report.fights {
                    println!(
                        "{:?} -> {:?}: {:?} ({}% / rolled {}) damage {}",
                        history.attacker_weapon,
                        history.body_part,
                        history.status,
                        history.hit_chance,
                        history.hit_roll,
                        history.real_damage()
                    );
                }
                println!(
                    "after {} rounds: {} wins, wanderer at {} hp, {} raiders down, {} loot piles",
                    report.rounds,
                    report.winner.as_deref().unwrap_or("nobody"),
                    report.wanderer_health,
                    report.raiders_down,
                    report.loot_piles
                );
            }
        }
        Command::Rest { hours, radiation } => {
            let report = rest(&config, &catalog, hours, radiation, seed, &mut dice)?;
            if json {
                print_json(&report);
            } else {
                println!(
                    "after {}h: health {}, rads {:.1}, thirst {:.1}, hunger {:.1}, sleep {:.1}",
                    report.hours, report.health, report.rads, report.thirst, report.hunger, report.sleep
                );
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(err) => eprintln!("error: {err}"),
    }
}

fn roll_scenario(
    config: &RulesConfig,
    catalog: &Catalog,
    stat: StatId,
    modifier: i64,
    count: u32,
    seed: u64,
    dice: &mut SeededDice,
) -> Result<RollReport> {
    let ctx = RulesContext::new(config, catalog);
    let mut character = Character::new("Wanderer", Race::Human);
    character.is_player = true;

    let mut rolls = Vec::with_capacity(count as usize);
    for _ in 0..count {
        rolls.push(roll(&ctx, &mut character, stat, modifier, dice)?);
    }
    let stats = RollStats::by_stat(&rolls);
    let success_rate = stats.get(&stat).map_or(0.0, |s| s.success_rate());
    Ok(RollReport {
        seed,
        stat,
        success_rate,
        rolls,
    })
}

/// Give `character` a stack of `item` and equip it
fn arm(ctx: &RulesContext<'_>, character: &mut Character, item: ItemId, quantity: i64) -> Result<()> {
    let stack = Equipment::new(ctx.catalog.item(item)?, quantity);
    let id = stack.id;
    character.inventory.push(stack);
    equip(ctx, character, id, false)
}

fn recruit(
    ctx: &RulesContext<'_>,
    campaign: &mut Campaign,
    name: &str,
    loadout: &[(ItemId, i64)],
    dice: &mut SeededDice,
) -> Result<Character> {
    let mut character = Character::new(name, Race::Human);
    for &(item, quantity) in loadout {
        arm(ctx, &mut character, item, quantity)?;
    }
    if character.inventory.iter().any(|e| e.clip_count.is_some()) {
        reload(ctx, &mut character, false)?;
    }
    let stats = ctx.stats(&character, dice)?;
    character.health = stats.max_health() as i64;
    character.action_points = stats.max_action_points() as i64;
    campaign.join(&mut character);
    Ok(character)
}

#[allow(clippy::too_many_arguments)]
fn skirmish(
    config: &RulesConfig,
    catalog: &Catalog,
    raiders: usize,
    range: i64,
    use_burst: bool,
    max_rounds: u32,
    seed: u64,
    dice: &mut SeededDice,
) -> Result<SkirmishReport> {
    let mut campaign = Campaign::new("Skirmish");
    let ctx = RulesContext::new(config, catalog);
    let gun = if use_burst { SMG } else { PISTOL };

    let mut wanderer = recruit(
        &ctx,
        &mut campaign,
        "Wanderer",
        &[(gun, 1), (ROUNDS, 120), (LEATHER_ARMOR, 1)],
        dice,
    )?;
    wanderer.is_player = true;
    let mut characters = vec![wanderer];
    for index in 0..raiders {
        let mut raider = recruit(&ctx, &mut campaign, &format!("Raider {}", index + 1), &[(KNIFE, 1)], dice)?;
        raider.reward = 50;
        raider.base.set(Special::Agility, 6.0);
        characters.push(raider);
    }

    let mut fights = Vec::new();
    let mut rounds = 0;
    while rounds < max_rounds {
        let raiders_alive = characters[1..].iter().any(|c| c.is_alive());
        if !characters[0].is_alive() || !raiders_alive {
            break;
        }
        let report = campaign.next_turn(config, catalog, &mut characters, 6, false, dice)?;
        let Some(current) = report.next else {
            break;
        };
        if Some(current) == characters.first().map(|c| c.id) {
            rounds += 1;
        }

        let ctx = campaign.context(config, catalog);
        let (wanderer, raiders) = characters.split_at_mut(1);
        let wanderer = &mut wanderer[0];
        if current == wanderer.id {
            wanderer_turn(&ctx, wanderer, raiders, range, use_burst, dice, &mut fights)?;
        } else if let Some(raider) = raiders.iter_mut().find(|c| c.id == current) {
            loop {
                let history = fight(&ctx, raider, wanderer, None, &FightRequest::at(1), dice)?;
                let status = history.status;
                fights.push(history);
                if status.is_early_exit() || !wanderer.is_alive() {
                    break;
                }
            }
        }
    }
    // One last tick loots whoever fell
    campaign.next_turn(config, catalog, &mut characters, 6, false, dice)?;
    if characters[1..].iter().all(|c| !c.is_alive()) {
        campaign.spawn_loot(config, catalog, RAIDER_STASH, characters.first(), dice)?;
    }

    let wanderer_health = characters[0].health;
    let raiders_down = characters[1..].iter().filter(|c| !c.is_alive()).count();
    let winner = if wanderer_health <= 0 {
        Some("raiders".to_string())
    } else if raiders_down == raiders {
        Some("wanderer".to_string())
    } else {
        None
    };
    tracing::info!(rounds, wanderer_health, raiders_down, "skirmish over");
    Ok(SkirmishReport {
        seed,
        winner,
        rounds,
        wanderer_health,
        raiders_down,
        loot_piles: campaign.loots.len(),
        fights,
    })
}

fn wanderer_turn(
    ctx: &RulesContext<'_>,
    wanderer: &mut Character,
    raiders: &mut [Character],
    range: i64,
    use_burst: bool,
    dice: &mut SeededDice,
    fights: &mut Vec<FightHistory>,
) -> Result<()> {
    loop {
        let standing = raiders.iter().filter(|c| c.is_alive()).count();
        if standing == 0 {
            return Ok(());
        }
        let histories = if use_burst && standing > 1 {
            let mut targets: Vec<BurstTarget<'_>> = raiders
                .iter_mut()
                .filter(|c| c.is_alive())
                .map(|c| BurstTarget::new(c, range))
                .collect();
            burst(ctx, wanderer, &mut targets, &FightRequest::at(range), dice)?
        } else {
            let mut standing = raiders.iter_mut().filter(|c| c.is_alive());
            let Some(target) = standing.next() else {
                return Ok(());
            };
            let secondary = standing.next();
            vec![fight(ctx, wanderer, target, secondary, &FightRequest::at(range), dice)?]
        };

        let status = histories.last().map(|h| h.status);
        fights.extend(histories);
        match status {
            Some(FightStatus::NoMoreAmmo) => {
                if reload(ctx, wanderer, true).is_err() {
                    return Ok(());
                }
            }
            Some(status) if status.is_early_exit() => return Ok(()),
            None => return Ok(()),
            _ => {}
        }
    }
}

fn rest(
    config: &RulesConfig,
    catalog: &Catalog,
    hours: i64,
    radiation: f64,
    seed: u64,
    dice: &mut SeededDice,
) -> Result<RestReport> {
    let mut campaign = Campaign::new("Camp");
    campaign.radiation_per_hour = radiation;
    let ctx = RulesContext::new(config, catalog);
    let mut sleeper = recruit(&ctx, &mut campaign, "Sleeper", &[], dice)?;
    sleeper.is_player = true;
    sleeper.health -= sleeper.health / 3;
    let mut characters = vec![sleeper];

    let mut turns = Vec::new();
    for _ in 0..hours.max(0) {
        turns.push(campaign.next_turn(config, catalog, &mut characters, HOUR, true, dice)?);
    }
    let sleeper = &characters[0];
    Ok(RestReport {
        seed,
        hours,
        health: sleeper.health,
        rads: sleeper.rads,
        thirst: sleeper.thirst,
        hunger: sleeper.hunger,
        sleep: sleeper.sleep,
        turns,
    })
}
