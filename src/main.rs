use grimoire::audio::NullMixer;
use grimoire::config::GameConfig;
use grimoire::display_manager::{create_screen, DisplayMode};
use grimoire::input::TerminalInput;
use grimoire::interpreter::{Collaborators, Interpreter};
use grimoire::movie::NoMovies;
use grimoire::opcode_tables::OpcodeTable;
use grimoire::resource::{DirectoryStore, ResourceStore};
use grimoire::tables::TableList;
use grimoire::world::load_game_data;
use log::{debug, info};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // No configuration means the user asked for help
    if args.len() < 2 {
        println!("grimoire - script interpreter for AGOS adventure games");
        println!();
        println!("Usage: {} <config.toml>", args[0]);
        println!();
        println!("The configuration names the game variant, its platform and the");
        println!("directory holding the data files. Set RUST_LOG for diagnostics");
        println!("and DISPLAY_MODE=terminal|headless to pick the screen.");
        return;
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), String> {
    let config = GameConfig::load(config_path)?;
    let mut store = DirectoryStore::new(config.data_dir.clone());

    let game_file = config.game_file_name().to_string();
    let game_data = store
        .read(&game_file)
        .ok_or_else(|| format!("Cannot open game file '{game_file}'"))?;
    let table = OpcodeTable::for_variant(config.variant);
    let world = load_game_data(&game_data, config.variant, table, config.tables_heap_size)?;

    let table_list = match &config.table_list_file {
        Some(name) => {
            let data = store
                .read(name)
                .ok_or_else(|| format!("Cannot open table list '{name}'"))?;
            let list = TableList::parse(&data)?;
            info!("{} overlay tables listed in {name}", list.entries().len());
            Some(list)
        }
        None => None,
    };

    let collaborators = Collaborators {
        screen: create_screen(DisplayMode::from_env())?,
        audio: Box::new(NullMixer::new()),
        input: Box::new(TerminalInput::new()),
        resources: Box::new(store),
        movies: Box::new(NoMovies),
    };

    let mut interpreter = Interpreter::new(config, world, collaborators);
    if let Some(list) = table_list {
        interpreter.set_table_list(list);
    }

    debug!("Starting game...");
    interpreter.run()?;
    debug!("Game ended normally.");
    Ok(())
}
