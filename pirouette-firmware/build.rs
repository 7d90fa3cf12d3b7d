//! Build script for pirouette-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates robot.toml at compile time
//! - Generates the `ROBOT_CONFIG` constant from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pirouette_core::config::{ConfigError, RobotConfig};

/// Flash size on the robot board, must match memory.x
const FLASH_SIZE: u32 = 2 * 1024 * 1024;

/// Flash reserved for the firmware image at the start of flash
const IMAGE_RESERVED: u32 = 1024 * 1024;

/// RP2040 flash erase size; the store region must be made of whole sectors
const ERASE_SIZE: u32 = 4096;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    let config = load_config();
    generate_config(&out_dir, &config);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and validate robot.toml
fn load_config() -> RobotConfig {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: robot.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a robot.toml configuration file.          ║\n\
            ║  Please create one in the pirouette-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read robot.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Unknown sections are almost always typos
    let value: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => report("Invalid TOML syntax in robot.toml", &e.to_string()),
    };
    if let Some(table) = value.as_table() {
        let unknown: Vec<String> = table
            .keys()
            .filter(|k| !["sequencer", "radio", "store"].contains(&k.as_str()))
            .map(|k| format!("Unknown section [{}]", k))
            .collect();
        if !unknown.is_empty() {
            report("Unexpected sections in robot.toml", &unknown.join("\n"));
        }
    }

    let config: RobotConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => report("Invalid value in robot.toml", &e.to_string()),
    };

    let mut errors = Vec::new();
    if let Err(e) = config.validate() {
        errors.push(describe(e).to_string());
    }
    let end = config.store.region_offset as u64 + config.store.sector_size as u64;
    if end > FLASH_SIZE as u64 {
        errors.push(format!(
            "[store] region ends at {:#x}, past the end of flash ({:#x})",
            end, FLASH_SIZE
        ));
    }
    if config.store.sector_size % ERASE_SIZE != 0 || config.store.region_offset % ERASE_SIZE != 0 {
        errors.push(format!(
            "[store] region_offset and sector_size must be multiples of {}",
            ERASE_SIZE
        ));
    }
    if config.store.region_offset < IMAGE_RESERVED {
        errors.push(format!(
            "[store] region_offset must be at least {:#x} (firmware image)",
            IMAGE_RESERVED
        ));
    }
    if !errors.is_empty() {
        report("Invalid robot configuration", &errors.join("\n"));
    }

    println!("cargo:warning=robot.toml validated successfully");
    config
}

fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::ZeroTickInterval => "[sequencer] tick_interval_ms must be non-zero",
        ConfigError::ZeroTimeUnit => "[sequencer] time_unit_ms must be non-zero",
        ConfigError::ZeroBaudrate => "[radio] baudrate must be non-zero",
        ConfigError::ZeroSectorSize => "[store] sector_size must be non-zero",
        ConfigError::UnalignedRegion => "[store] region_offset must be a multiple of sector_size",
        ConfigError::SectorTooSmall => "[store] sector_size too small for the choreography",
    }
}

/// Abort the build with a boxed error message
fn report(title: &str, msg: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(msg)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the validated configuration as a Rust constant
fn generate_config(out_dir: &Path, config: &RobotConfig) {
    let source = format!(
        "/// Robot configuration from robot.toml\n\
         pub const ROBOT_CONFIG: RobotConfig = RobotConfig {{\n    \
             sequencer: SequencerConfig {{\n        \
                 tick_interval_ms: {},\n        \
                 time_unit_ms: {},\n    \
             }},\n    \
             radio: RadioLinkConfig {{\n        \
                 baudrate: {},\n    \
             }},\n    \
             store: StoreConfig {{\n        \
                 region_offset: {:#x},\n        \
                 sector_size: {},\n    \
             }},\n\
         }};\n",
        config.sequencer.tick_interval_ms,
        config.sequencer.time_unit_ms,
        config.radio.baudrate,
        config.store.region_offset,
        config.store.sector_size,
    );
    fs::write(out_dir.join("robot_config.rs"), source).unwrap();
}
