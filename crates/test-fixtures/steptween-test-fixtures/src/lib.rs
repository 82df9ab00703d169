//! Shared test fixtures: a recording in-memory world and JSON timeline scripts.

pub mod sim;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use sim::{Scene, SceneObject, SimObject, SimOp, SimWorld};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    timelines: HashMap<String, TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    script: String,
    #[serde(default)]
    scene: Option<String>,
}

/// A timeline expressed as data: engine options, defaults and a list of `to` calls.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineScript {
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub defaults: Option<serde_json::Value>,
    pub tweens: Vec<TweenStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweenStep {
    /// Object name inside the scene.
    pub target: String,
    pub vars: serde_json::Value,
    #[serde(default)]
    pub position: Option<serde_json::Value>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod timelines {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.timelines.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn script_json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.timelines, "timeline", name)?;
        read_to_string(&entry.script)
    }

    pub fn script(name: &str) -> Result<TimelineScript> {
        let entry = lookup(&MANIFEST.timelines, "timeline", name)?;
        super::load_json(&entry.script)
    }

    /// Scene for the timeline; an empty scene when the manifest names none.
    pub fn scene(name: &str) -> Result<Scene> {
        let entry = lookup(&MANIFEST.timelines, "timeline", name)?;
        match &entry.scene {
            Some(scene) => super::load_json(scene),
            None => Ok(Scene::default()),
        }
    }

    /// Fresh world populated from the timeline's scene.
    pub fn world(name: &str) -> Result<SimWorld> {
        Ok(SimWorld::from_scene(&scene(name)?))
    }

    pub fn script_path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.timelines, "timeline", name)?;
        Ok(resolve_path(&entry.script))
    }
}
