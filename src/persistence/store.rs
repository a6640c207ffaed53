//! Transactional simulation store
//!
//! Two tables, kept in memory and mirrored to a YAML file:
//! - `simulations`  one row per saved simulation
//! - `objects`      one row per body, keyed by `simulation_id`
//!
//! Every mutation is staged on a copy of the tables, written to a temporary
//! file next to the store and renamed over it. The in-memory tables are only
//! replaced after the rename succeeds, so a failed save or delete leaves both
//! the file and memory as they were.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::simulation::error::ConfigError;
use crate::simulation::registry::{BodyRegistry, Visual};
use crate::simulation::states::{Body, NVec3};

pub type SimulationId = i64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is malformed: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("simulation {0} does not exist")]
    NotFound(SimulationId),

    #[error("simulation name must not be empty")]
    EmptyName,

    #[error("object row {row} of simulation {simulation} is invalid: {source}")]
    InvalidRow {
        simulation: SimulationId,
        row: i64,
        #[source]
        source: ConfigError,
    },
}

/// Row of the `simulations` table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    pub id: SimulationId,
    pub name: String,
    pub gravitational_constant: f64,
    pub created_at: DateTime<Utc>,
}

/// Row of the `objects` table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub id: i64,
    pub simulation_id: SimulationId,
    pub mesh_id: Option<i64>,
    pub name: String,
    pub mass: f64,
    pub density: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl ObjectRecord {
    fn to_body(&self) -> Result<(Body, Visual), StoreError> {
        let body = Body::new(
            NVec3::from(self.position),
            NVec3::from(self.velocity),
            self.mass,
            self.density,
        )
        .map_err(|source| StoreError::InvalidRow {
            simulation: self.simulation_id,
            row: self.id,
            source,
        })?;
        let visual = Visual {
            name: self.name.clone(),
            mesh_id: self.mesh_id,
        };
        Ok((body, visual))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Tables {
    next_simulation_id: SimulationId,
    next_object_id: i64,
    simulations: Vec<SimulationRecord>,
    objects: Vec<ObjectRecord>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_simulation_id: 1,
            next_object_id: 1,
            simulations: Vec::new(),
            objects: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct SimulationStore {
    path: Option<PathBuf>,
    tables: Tables,
}

impl SimulationStore {
    /// Store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: Tables::default(),
        }
    }

    /// Open the store file at `path`, creating it (and its directory) if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            return Self::open_existing(path);
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let store = Self {
            path: Some(path),
            tables: Tables::default(),
        };
        store.flush(&store.tables)?;
        Ok(store)
    }

    /// Open a store file that must already exist; nothing is created on disk
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let reader = BufReader::new(File::open(&path)?);
        let tables: Tables = serde_yaml::from_reader(reader)?;
        Ok(Self {
            path: Some(path),
            tables,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn simulation_count(&self) -> usize {
        self.tables.simulations.len()
    }

    pub fn object_count(&self) -> usize {
        self.tables.objects.len()
    }

    /// All simulations ordered by id
    pub fn list_simulations(&self) -> Vec<SimulationRecord> {
        self.tables.simulations.clone()
    }

    pub fn simulation(&self, id: SimulationId) -> Option<&SimulationRecord> {
        self.tables.simulations.iter().find(|s| s.id == id)
    }

    /// Object rows of one simulation, in saved order
    pub fn objects(&self, id: SimulationId) -> impl Iterator<Item = &ObjectRecord> {
        self.tables.objects.iter().filter(move |o| o.simulation_id == id)
    }

    /// Save every body in `registry` as a new simulation
    ///
    /// The simulation row and all object rows are committed together
    pub fn save_simulation(
        &mut self,
        name: &str,
        g: f64,
        registry: &BodyRegistry,
    ) -> Result<SimulationId, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        self.transaction(|t| {
            let sim_id = t.next_simulation_id;
            t.next_simulation_id += 1;
            t.simulations.push(SimulationRecord {
                id: sim_id,
                name: name.to_string(),
                gravitational_constant: g,
                created_at: Utc::now(),
            });

            for (_, body, visual) in registry.iter() {
                let id = t.next_object_id;
                t.next_object_id += 1;
                t.objects.push(ObjectRecord {
                    id,
                    simulation_id: sim_id,
                    mesh_id: visual.mesh_id,
                    name: visual.name.clone(),
                    mass: body.mass(),
                    density: body.density(),
                    position: body.x.into(),
                    velocity: body.v.into(),
                });
            }
            Ok(sim_id)
        })
    }

    /// Add the bodies of simulation `id` to `registry`
    ///
    /// Each body is built with its saved velocity and position before it is
    /// registered, so it is live with the right state from its first tick.
    /// If any row is invalid nothing is added.
    pub fn load_simulation(
        &self,
        id: SimulationId,
        registry: &mut BodyRegistry,
    ) -> Result<SimulationRecord, StoreError> {
        let record = self.simulation(id).cloned().ok_or(StoreError::NotFound(id))?;

        let bodies = self
            .objects(id)
            .map(ObjectRecord::to_body)
            .collect::<Result<Vec<_>, _>>()?;

        for (body, visual) in bodies {
            registry.add(body, visual);
        }
        Ok(record)
    }

    /// Delete a simulation and its objects
    ///
    /// Returns `Ok(false)` without touching the store if `id` does not exist
    pub fn delete_simulation(&mut self, id: SimulationId) -> Result<bool, StoreError> {
        if self.simulation(id).is_none() {
            return Ok(false);
        }

        self.transaction(|t| {
            // objects first, then the simulation row
            t.objects.retain(|o| o.simulation_id != id);
            t.simulations.retain(|s| s.id != id);
            Ok(true)
        })
    }

    /// Stage `f` on a copy of the tables and commit it atomically
    fn transaction<T, F>(&mut self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Tables) -> Result<T, StoreError>,
    {
        let mut staged = self.tables.clone();
        let out = f(&mut staged)?;
        self.flush(&staged)?;
        self.tables = staged;
        Ok(out)
    }

    fn flush(&self, tables: &Tables) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_yaml::to_writer(&mut writer, tables)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(k: usize) -> BodyRegistry {
        let mut reg = BodyRegistry::new();
        for i in 0..k {
            let f = i as f64;
            let body = Body::new(
                NVec3::new(f * 0.1, -f, 1.0 / 3.0),
                NVec3::new(0.7 * f, 0.0, -1e-9),
                1.0 + f,
                2.5,
            )
            .unwrap();
            reg.add(body, Visual::named(format!("body{i}")));
        }
        reg
    }

    #[test]
    fn save_assigns_increasing_ids() {
        let mut store = SimulationStore::in_memory();
        let a = store.save_simulation("first", 1.0, &registry(2)).unwrap();
        let b = store.save_simulation("second", 0.5, &registry(3)).unwrap();

        assert!(b > a);
        assert_eq!(store.simulation_count(), 2);
        assert_eq!(store.object_count(), 5);
        assert_eq!(store.objects(b).count(), 3);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = SimulationStore::in_memory();
        assert!(matches!(
            store.save_simulation("  ", 1.0, &registry(1)),
            Err(StoreError::EmptyName)
        ));
        assert_eq!(store.simulation_count(), 0);
    }

    #[test]
    fn open_existing_never_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("store.yaml");

        assert!(matches!(SimulationStore::open_existing(&path), Err(StoreError::Io(_))));
        assert!(!path.exists());
        assert!(!dir.path().join("missing").exists());

        SimulationStore::open(&path).unwrap();
        let store = SimulationStore::open_existing(&path).unwrap();
        assert_eq!(store.simulation_count(), 0);
    }

    #[test]
    fn load_unknown_id_fails() {
        let store = SimulationStore::in_memory();
        let mut reg = BodyRegistry::new();
        assert!(matches!(
            store.load_simulation(42, &mut reg),
            Err(StoreError::NotFound(42))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn delete_removes_only_that_simulation() {
        let mut store = SimulationStore::in_memory();
        let a = store.save_simulation("a", 1.0, &registry(2)).unwrap();
        let b = store.save_simulation("b", 1.0, &registry(4)).unwrap();

        assert!(store.delete_simulation(a).unwrap());
        assert_eq!(store.simulation_count(), 1);
        assert_eq!(store.object_count(), 4);
        assert!(store.simulation(b).is_some());
    }
}
