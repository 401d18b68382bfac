//! CLI command definitions using clap.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use craftform_client::{ClientConfig, ConfigOverrides, RateLimit};
use craftform_core::{
    CubeDimensions, CubeSpec, CylinderDimensions, CylinderSpec, EntitySpec, Location, ResourceId,
};
use craftform_reconciler::PollPolicy;

use crate::commands::Action;

/// craftform - reconcile block-world resources over REST
#[derive(Parser, Debug)]
#[command(name = "craftform")]
#[command(version)]
#[command(about = "Create, read, update and delete cubes, cylinders and entities")]
#[command(
    long_about = "craftform issues each change to the resource service and then polls until the service reports it settled. Results print as JSON on stdout; logs go to stderr (RUST_LOG controls the level)."
)]
pub struct Cli {
    /// Client configuration file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service address, e.g. http://localhost:8080
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Path prefix every resource path is resolved under
    #[arg(long, global = true)]
    pub base_path: Option<String>,

    /// Extra request header as `Name: value` (repeatable)
    #[arg(long = "header", global = true, value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Outbound requests per second (0 disables limiting)
    #[arg(long, global = true)]
    pub rate_limit: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,

    /// How long to wait for a change to settle, in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Pause between confirmation reads, in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    pub interval_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Axis-aligned box of one material
    Cube {
        #[command(subcommand)]
        action: CubeAction,
    },

    /// Upright cylinder of one material
    Cylinder {
        #[command(subcommand)]
        action: CylinderAction,
    },

    /// Spawned entity
    Entity {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CubeAction {
    /// Create a cube and wait until it is ready
    Create(CubeArgs),
    /// Print the cube's current state
    Read(IdArg),
    /// Replace the cube's attributes and wait until ready
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        spec: CubeArgs,
    },
    /// Delete the cube and wait until it is gone
    Delete(IdArg),
}

#[derive(Subcommand, Debug)]
pub enum CylinderAction {
    /// Create a cylinder and wait until it is ready
    Create(CylinderArgs),
    /// Print the cylinder's current state
    Read(IdArg),
    /// Replace the cylinder's attributes and wait until ready
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        spec: CylinderArgs,
    },
    /// Delete the cylinder and wait until it is gone
    Delete(IdArg),
}

#[derive(Subcommand, Debug)]
pub enum EntityAction {
    /// Spawn an entity and wait until it is ready
    Create(EntityArgs),
    /// Print the entity's current state
    Read(IdArg),
    /// Replace the entity's attributes and wait until ready
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        spec: EntityArgs,
    },
    /// Remove the entity and wait until it is gone
    Delete(IdArg),
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Identifier assigned by the service
    #[arg(long)]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub x: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub y: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub z: i64,
    /// World the resource lives in
    #[arg(long, default_value = "world")]
    pub world: String,
}

#[derive(Args, Debug, Clone)]
pub struct CubeArgs {
    /// Block material, e.g. stone
    #[arg(long)]
    pub material: String,
    #[command(flatten)]
    pub location: LocationArgs,
    /// Extent along x
    #[arg(long)]
    pub length: i64,
    /// Extent along y
    #[arg(long)]
    pub height: i64,
    /// Extent along z
    #[arg(long)]
    pub width: i64,
}

#[derive(Args, Debug, Clone)]
pub struct CylinderArgs {
    /// Block material, e.g. glass
    #[arg(long)]
    pub material: String,
    #[command(flatten)]
    pub location: LocationArgs,
    #[arg(long)]
    pub radius: i64,
    #[arg(long)]
    pub height: i64,
}

#[derive(Args, Debug, Clone)]
pub struct EntityArgs {
    /// Entity type, e.g. villager
    #[arg(long)]
    pub entity_type: String,
    /// Name tag shown above the entity
    #[arg(long, default_value = "")]
    pub custom_name: String,
    #[command(flatten)]
    pub location: LocationArgs,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl Cli {
    /// Client configuration: environment, then `--config`, then flags.
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.layer_onto(ClientConfig::from_env())
    }

    fn layer_onto(&self, base: ClientConfig) -> Result<ClientConfig> {
        let base = match &self.config {
            Some(path) => base.layer(
                ConfigOverrides::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
            ),
            None => base,
        };
        Ok(base.layer(self.overrides()))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            address: self.address.clone(),
            base_path: self.base_path.clone(),
            headers: self.headers.iter().cloned().collect::<BTreeMap<_, _>>(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            rate_limit: self
                .rate_limit
                .map(|per_second| RateLimit::new(per_second, per_second.max(1))),
        }
    }

    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_millis(self.interval_ms),
        )
    }
}

impl From<LocationArgs> for Location {
    fn from(args: LocationArgs) -> Self {
        Self::new(args.x, args.y, args.z, args.world)
    }
}

impl From<CubeArgs> for CubeSpec {
    fn from(args: CubeArgs) -> Self {
        Self {
            material: args.material,
            location: args.location.into(),
            dimensions: CubeDimensions::new(args.length, args.height, args.width),
        }
    }
}

impl From<CylinderArgs> for CylinderSpec {
    fn from(args: CylinderArgs) -> Self {
        Self {
            material: args.material,
            location: args.location.into(),
            dimensions: CylinderDimensions::new(args.height, args.radius),
        }
    }
}

impl From<EntityArgs> for EntitySpec {
    fn from(args: EntityArgs) -> Self {
        Self {
            entity_type: args.entity_type,
            custom_name: args.custom_name,
            location: args.location.into(),
        }
    }
}

impl From<CubeAction> for Action<CubeSpec> {
    fn from(action: CubeAction) -> Self {
        match action {
            CubeAction::Create(spec) => Self::Create(spec.into()),
            CubeAction::Read(IdArg { id }) => Self::Read(ResourceId::new(id)),
            CubeAction::Update { id, spec } => Self::Update(ResourceId::new(id), spec.into()),
            CubeAction::Delete(IdArg { id }) => Self::Delete(ResourceId::new(id)),
        }
    }
}

impl From<CylinderAction> for Action<CylinderSpec> {
    fn from(action: CylinderAction) -> Self {
        match action {
            CylinderAction::Create(spec) => Self::Create(spec.into()),
            CylinderAction::Read(IdArg { id }) => Self::Read(ResourceId::new(id)),
            CylinderAction::Update { id, spec } => Self::Update(ResourceId::new(id), spec.into()),
            CylinderAction::Delete(IdArg { id }) => Self::Delete(ResourceId::new(id)),
        }
    }
}

impl From<EntityAction> for Action<EntitySpec> {
    fn from(action: EntityAction) -> Self {
        match action {
            EntityAction::Create(spec) => Self::Create(spec.into()),
            EntityAction::Read(IdArg { id }) => Self::Read(ResourceId::new(id)),
            EntityAction::Update { id, spec } => Self::Update(ResourceId::new(id), spec.into()),
            EntityAction::Delete(IdArg { id }) => Self::Delete(ResourceId::new(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use std::io::Write;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("craftform").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cube_create() {
        let cli = parse(&[
            "cube", "create", "--material", "stone", "--x", "0", "--y", "10", "--z", "-4",
            "--length", "2", "--height", "3", "--width", "4",
        ]);
        let Commands::Cube { action } = cli.command else {
            panic!("expected a cube command");
        };
        let Action::Create(spec) = Action::<CubeSpec>::from(action) else {
            panic!("expected create");
        };
        assert_eq!(spec.material, "stone");
        assert_eq!(spec.location, Location::new(0, 10, -4, "world"));
        assert_eq!(spec.dimensions, CubeDimensions::new(2, 3, 4));
    }

    #[test]
    fn test_parse_cylinder_update_keeps_radius_and_height_apart() {
        let cli = parse(&[
            "cylinder", "update", "--id", "y-1", "--material", "glass", "--x", "1", "--y", "2",
            "--z", "3", "--world", "nether", "--radius", "5", "--height", "9",
        ]);
        let Commands::Cylinder { action } = cli.command else {
            panic!("expected a cylinder command");
        };
        let Action::Update(id, spec) = Action::<CylinderSpec>::from(action) else {
            panic!("expected update");
        };
        assert_eq!(id, ResourceId::from("y-1"));
        assert_eq!(spec.dimensions.radius, 5);
        assert_eq!(spec.dimensions.height, 9);
        assert_eq!(spec.location.world, "nether");
    }

    #[test]
    fn test_parse_entity_delete() {
        let cli = parse(&["entity", "delete", "--id", "e-7"]);
        let Commands::Entity { action } = cli.command else {
            panic!("expected an entity command");
        };
        assert!(matches!(
            Action::<EntitySpec>::from(action),
            Action::Delete(id) if id == ResourceId::from("e-7")
        ));
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Api-Key: secret").unwrap(),
            ("X-Api-Key".to_string(), "secret".to_string())
        );
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_flags_override_file_and_base() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "address = \"http://file:9000\"\nbase_path = \"/v1\"\n\n[headers]\nX-Team = \"blue\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = parse(&[
            "--config", path, "--address", "http://flag:7000", "--header", "X-Team: red",
            "--rate-limit", "5", "entity", "read", "--id", "e-1",
        ]);

        let config = cli.layer_onto(ClientConfig::default()).unwrap();
        assert_eq!(config.address, "http://flag:7000");
        assert_eq!(config.base_path, "/v1");
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("red"));
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(config.rate_limit, RateLimit::new(5, 5));
    }

    #[test]
    fn test_poll_policy_from_flags() {
        let cli = parse(&["--timeout-secs", "5", "--interval-ms", "250", "cube", "read", "--id", "c"]);
        assert_eq!(
            cli.poll_policy(),
            PollPolicy::new(Duration::from_secs(5), Duration::from_millis(250))
        );
    }
}
