use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::builder::RangedU64ValueParser;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::Level;

use floor_generator::ascii::{self, AsciiMode};
use floor_generator::config::GenParams;
use floor_generator::decor::{self, ShatterArea};
use floor_generator::dungeon::DungeonRegistry;
use floor_generator::error::{GenError, GenResult};
use floor_generator::export;
use floor_generator::feature::{feat, FeatureRegistry, Palette};
use floor_generator::grid::{CellFlags, Floor};
use floor_generator::occupants::{ObjectKind, OccupantLedger, RemovedObject};
use floor_generator::plasma::{plasma_fill, HeightField};
use floor_generator::prob_table::FloorWallTypes;
use floor_generator::river;
use floor_generator::rng::GenRng;
use floor_generator::streamer;
use floor_generator::terrain::{TerrainTables, MAX_FEAT_IN_TERRAIN};
use floor_generator::wilderness::{self, atlas, PlainTowns, Wilderness, WildernessLayout};

#[derive(Parser, Debug)]
#[command(name = "floor_generator")]
#[command(about = "Generate roguelike dungeon levels and wilderness tiles")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// JSON file overriding generation parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON feature registry (built-in set if not specified)
    #[arg(long, global = true)]
    features: Option<PathBuf>,

    /// JSON dungeon list (built-in set if not specified)
    #[arg(long, global = true)]
    dungeons: Option<PathBuf>,

    /// JSON terrain tables (built-in set if not specified)
    #[arg(long, global = true)]
    terrains: Option<PathBuf>,

    /// JSON wilderness layout (built-in demo if not specified)
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Log verbosity: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one stitched wilderness tile
    Wild {
        /// Tile column (default: layout start)
        #[arg(short)]
        x: Option<i32>,
        /// Tile row (default: layout start)
        #[arg(short)]
        y: Option<i32>,
        /// Generate at night
        #[arg(long)]
        night: bool,
        /// The game has been won
        #[arg(long)]
        winner: bool,
        #[arg(long, default_value_t = wilderness::TILE_WIDTH, value_parser = tile_size_parser())]
        tile_width: usize,
        #[arg(long, default_value_t = wilderness::TILE_HEIGHT, value_parser = tile_size_parser())]
        tile_height: usize,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Build a dungeon level with veins, rivers and tree clusters
    Dungeon {
        /// Dungeon id
        #[arg(short, long, default_value = "1")]
        id: u16,
        #[arg(short = 'W', long, default_value_t = wilderness::TILE_WIDTH, value_parser = tile_size_parser())]
        width: usize,
        #[arg(short = 'H', long, default_value_t = wilderness::TILE_HEIGHT, value_parser = tile_size_parser())]
        height: usize,
        /// Open caverns to carve
        #[arg(long, default_value = "6")]
        caverns: usize,
        #[arg(long, default_value = "3")]
        magma: usize,
        #[arg(long, default_value = "2")]
        quartz: usize,
        #[arg(long, default_value = "1")]
        rivers: usize,
        /// Rivers of lava instead of water
        #[arg(long)]
        lava: bool,
        /// Grow a tree cluster in every cavern
        #[arg(long)]
        trees: bool,
        /// Wreck the level afterwards
        #[arg(long)]
        destroy: bool,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// One cell per tile map of the whole wilderness
    Overview {
        #[arg(long)]
        winner: bool,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Generate every tile in parallel and stitch them into one image
    Atlas {
        /// Output PNG path
        png: PathBuf,
        #[arg(long)]
        night: bool,
        #[arg(long)]
        winner: bool,
        #[arg(long, default_value = "66", value_parser = tile_size_parser())]
        tile_width: usize,
        #[arg(long, default_value = "22", value_parser = tile_size_parser())]
        tile_height: usize,
    },
    /// Raw plasma height field as a grayscale image
    Plasma {
        /// Output PNG path
        png: PathBuf,
        #[arg(short = 'W', long, default_value = "129", value_parser = tile_size_parser())]
        width: usize,
        #[arg(short = 'H', long, default_value = "129", value_parser = tile_size_parser())]
        height: usize,
        #[arg(long)]
        roughness: Option<i16>,
    },
}

/// Grid dimensions must leave at least one interior cell.
fn tile_size_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(wilderness::MIN_TILE_SIZE as u64..)
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Write a PNG of the result
    #[arg(long)]
    png: Option<PathBuf>,
    /// Pixels per cell in PNG output
    #[arg(long, default_value = "4")]
    scale: u32,
    /// Write the ASCII map, legend and flags to a text file
    #[arg(long)]
    ascii: Option<PathBuf>,
    /// What to print to stdout
    #[arg(long, value_enum, default_value_t = View::Shown)]
    view: View,
    /// Print with terminal colours
    #[arg(long)]
    color: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum View {
    Shown,
    Actual,
    Flags,
    None,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> GenResult<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = GenRng::from_seed(seed);
    println!("Seed: {}", seed);

    let params = match &args.config {
        Some(path) => GenParams::load(path)?,
        None => GenParams::default(),
    };
    let registry = Arc::new(match &args.features {
        Some(path) => FeatureRegistry::load(path)?,
        None => FeatureRegistry::standard(),
    });
    let dungeons = match &args.dungeons {
        Some(path) => DungeonRegistry::load(path)?,
        None => DungeonRegistry::standard(),
    };

    match &args.command {
        Command::Wild { x, y, night, winner, tile_width, tile_height, out } => {
            let (mut wild, start) = load_wilderness(args, &params, registry, dungeons, &mut rng)?;
            wild = wild.with_tile_size(*tile_width, *tile_height);
            wild.total_winner = *winner;

            let (x, y) = (x.unwrap_or(start.0 as i32), y.unwrap_or(start.1 as i32));
            let tile = wild.map.tile(x, y);
            println!(
                "Generating wilderness tile ({}, {}): {:?}, level {}{}",
                x,
                y,
                tile.terrain,
                tile.level,
                if tile.name.is_empty() { String::new() } else { format!(", {}", tile.name) }
            );

            let mut floor = wild.new_floor();
            wilderness::wilderness_gen(&wild, &mut floor, x, y, !*night, &PlainTowns::default(), &mut rng);
            if floor.count_feat(wild.palette.entrance) > 0 {
                println!("Dungeon entrance on this tile");
            }
            emit(&floor, "WILDERNESS TILE", seed, out)
        }

        Command::Dungeon { id, width, height, caverns, magma, quartz, rivers, lava, trees, destroy, out } => {
            let dungeon = dungeons
                .get(*id)
                .ok_or_else(|| GenError::Dungeon(format!("no dungeon with id {}", id)))?;
            println!("Building level of {} ({}x{})", dungeon.name, width, height);

            let walls = FloorWallTypes::for_dungeon(dungeon)?;
            let palette = Palette::default();
            let mut floor = Floor::new(*width, *height, registry);
            floor.darkness = dungeon.darkness;
            floor.base_level = dungeon.min_depth;
            floor.fill_with_walls(&walls, palette.permanent, &mut rng);

            let mut occupants = OccupantLedger::new();
            let centers = carve_caverns(&mut floor, &walls, *caverns, &mut occupants, &mut rng);
            println!("Carved {} caverns", centers.len());

            for (vein, count, gold) in [
                (palette.magma, *magma, params.streamer.magma_gold_chance),
                (palette.quartz, *quartz, params.streamer.quartz_gold_chance),
            ] {
                for _ in 0..count {
                    let outcome = streamer::build_streamer(&mut floor, vein, gold, &mut occupants, &params.streamer, &mut rng);
                    if outcome.exhausted {
                        println!("Streamer gave up after placing {} cells", outcome.placed);
                    }
                }
            }

            let (center, edge) = if *lava {
                (feat::DEEP_LAVA, feat::SHALLOW_LAVA)
            } else {
                (feat::DEEP_WATER, feat::SHALLOW_WATER)
            };
            for _ in 0..*rivers {
                let end = river::add_river(&mut floor, center, edge, &params.river, &mut rng);
                println!("River ends at {:?}", end);
            }

            if *trees {
                let stairs = centers
                    .iter()
                    .filter(|&&(cx, cy)| decor::place_trees(&mut floor, cx, cy, &palette, &params.decor, false, &mut rng))
                    .count();
                println!("Planted {} tree clusters ({} with stairs)", centers.len(), stairs);
            }

            if *destroy {
                let mut shatter = ShatterArea::new(palette, &mut occupants);
                let epicenters = decor::destroy_level(&mut floor, &mut shatter, &params.decor, &mut rng);
                println!("Destroyed {} areas", epicenters.len());
            }

            println!(
                "Monsters left: {}, artifacts released: {}",
                occupants.monster_count(),
                occupants.released_artifacts().len()
            );
            emit(&floor, &dungeon.name.to_uppercase(), seed, out)
        }

        Command::Overview { winner, out } => {
            let (mut wild, _) = load_wilderness(args, &params, registry, dungeons, &mut rng)?;
            wild.total_winner = *winner;
            println!("Wilderness overview: {}x{} tiles", wild.map.width(), wild.map.height());
            let map = wilderness::overview(&wild);
            emit(&map, "WILDERNESS OVERVIEW", seed, out)
        }

        Command::Atlas { png, night, winner, tile_width, tile_height } => {
            let (mut wild, _) = load_wilderness(args, &params, registry, dungeons, &mut rng)?;
            wild = wild.with_tile_size(*tile_width, *tile_height);
            wild.total_winner = *winner;

            let coords = atlas::all_tiles(&wild);
            println!("Generating {} tiles of {}x{}...", coords.len(), tile_width, tile_height);
            let tiles = atlas::pregenerate(&wild, &coords, !*night, &PlainTowns::default(), seed);
            export::export_atlas_png(&tiles, wild.map.width(), *night, png)?;
            println!("Atlas saved to {}", png.display());
            Ok(())
        }

        Command::Plasma { png, width, height, roughness } => {
            let rough = roughness.unwrap_or(params.wilderness.plasma.roughness);
            let max = (MAX_FEAT_IN_TERRAIN - 1) as i16;
            let mut field = HeightField::new_with(*width, *height, (MAX_FEAT_IN_TERRAIN / 2) as i16);
            let (x2, y2) = (width.saturating_sub(1), height.saturating_sub(1));
            for (cx, cy) in [(0, 0), (0, y2), (x2, 0), (x2, y2)] {
                field.set(cx, cy, rng.randint0(MAX_FEAT_IN_TERRAIN as i32) as i16);
            }
            plasma_fill(&mut field, 0, 0, x2, y2, max, rough, &mut rng);
            export::export_heightfield(&field, max, png)?;
            println!("Height field saved to {}", png.display());
            Ok(())
        }
    }
}

/// Layout, terrain tables and tile seeds for the surface.
fn load_wilderness(
    args: &Args,
    params: &GenParams,
    registry: Arc<FeatureRegistry>,
    dungeons: DungeonRegistry,
    rng: &mut GenRng,
) -> GenResult<(Wilderness, (usize, usize))> {
    let layout = match &args.layout {
        Some(path) => WildernessLayout::load(path)?,
        None => WildernessLayout::demo(),
    };
    let terrains = match &args.terrains {
        Some(path) => TerrainTables::load(path)?,
        None => TerrainTables::standard()?,
    };

    let (mut map, start) = layout.build()?;
    map.seed_all(rng);
    map.apply_entrances(&dungeons);

    let wild = Wilderness::new(map, terrains, dungeons, registry, params.wilderness.clone());
    Ok((wild, start))
}

/// Open up rectangular caverns joined by corridors, each with a resident.
/// The first cavern also holds a treasure pile. Returns the cavern centres.
fn carve_caverns(
    floor: &mut Floor,
    walls: &FloorWallTypes,
    count: usize,
    occupants: &mut OccupantLedger,
    rng: &mut GenRng,
) -> Vec<(i32, i32)> {
    let (w, h) = (floor.width(), floor.height());
    let mut centers: Vec<(i32, i32)> = Vec::with_capacity(count);
    if w < 20 || h < 12 {
        return centers;
    }

    for i in 0..count {
        let cx = rng.rand_range(8, w - 9);
        let cy = rng.rand_range(5, h - 6);
        let rw = rng.rand_range(3, 7);
        let rh = rng.rand_range(2, 3);
        for y in (cy - rh)..=(cy + rh) {
            for x in (cx - rw)..=(cx + rw) {
                open_cell(floor, walls, x, y, rng);
            }
        }

        if let Some(&(px, py)) = centers.last() {
            for x in px.min(cx)..=px.max(cx) {
                open_cell(floor, walls, x, py, rng);
            }
            for y in py.min(cy)..=py.max(cy) {
                open_cell(floor, walls, cx, y, rng);
            }
        }

        let monster = occupants.spawn_monster(&[feat::FLOOR, feat::DIRT]);
        if let Some(cell) = floor.cell_mut(cx + 1, cy) {
            cell.monster = Some(monster);
        }
        if i == 0 {
            let pile = occupants.drop_stack(vec![
                RemovedObject::plain("Iron Shot"),
                RemovedObject { name: "Phial of Light".to_string(), kind: ObjectKind::FixedArtifact },
            ]);
            if let Some(cell) = floor.cell_mut(cx - 1, cy) {
                cell.object = Some(pile);
            }
        }
        centers.push((cx, cy));
    }

    centers
}

fn open_cell(floor: &mut Floor, walls: &FloorWallTypes, x: i32, y: i32, rng: &mut GenRng) {
    if !floor.in_bounds(x, y) {
        return;
    }
    let ground = walls.random_ground(rng);
    if let Some(cell) = floor.cell_mut(x, y) {
        cell.feat = ground;
        cell.info.remove(CellFlags::EXTRA);
        cell.info.insert(CellFlags::ROOM);
    }
}

/// Print and save a generated floor as requested.
fn emit(floor: &Floor, title: &str, seed: u64, out: &OutputArgs) -> GenResult<()> {
    let mode = match out.view {
        View::Shown => Some(AsciiMode::Shown),
        View::Actual => Some(AsciiMode::Actual),
        View::Flags => Some(AsciiMode::Flags),
        View::None => None,
    };
    if let Some(mode) = mode {
        if out.color && mode == AsciiMode::Shown {
            print!("{}", ascii::render_colored_ascii_floor(floor));
        } else {
            ascii::print_ascii_floor(floor, mode);
        }
    }

    if let Some(path) = &out.ascii {
        ascii::export_floor_file(floor, title, seed, path)?;
        println!("ASCII map saved to {}", path.display());
    }
    if let Some(path) = &out.png {
        save_png(floor, out.scale, path)?;
    }
    Ok(())
}

fn save_png(floor: &Floor, scale: u32, path: &Path) -> GenResult<()> {
    export::export_floor_png(floor, scale, true, path)?;
    println!("PNG saved to {}", path.display());
    Ok(())
}
