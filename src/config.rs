//! Balance tables
//!
//! Immutable, id-keyed data consumed by the simulation. Loaded from JSON or
//! taken from the built-in defaults, then validated once; a world is never
//! built from a table that fails [`GameConfig::validate`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::ecs::{AiBehaviour, FirePattern, PowerupKind};
use crate::error::ConfigError;
use crate::sim::collision::{CollisionLayer, Shape};

/// Weapon stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub pattern: FirePattern,
    pub cooldown_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    #[serde(default = "default_bullet_radius")]
    pub bullet_radius: f32,
}

fn default_bullet_radius() -> f32 {
    4.0
}

fn default_shrink() -> f32 {
    1.0
}

fn default_enemy_layer() -> String {
    CollisionLayer::Enemy.as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDef {
    pub hp: f32,
    pub shield: f32,
    #[serde(default)]
    pub defense_pct: f32,
    /// Movement speed (px/s)
    pub speed: f32,
    pub hitbox: Shape,
    /// Hitbox scale; the player's is usually well under 1
    #[serde(default = "default_shrink")]
    pub shrink: f32,
    /// Damage dealt to enemies that ram the player
    pub contact_damage: f32,
    /// Invincibility granted after taking a hit
    pub hit_invincibility_ms: f32,
    /// Invincibility on spawn
    #[serde(default)]
    pub spawn_invincibility_ms: f32,
    pub weapon: WeaponDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub hp: f32,
    #[serde(default)]
    pub shield: f32,
    #[serde(default)]
    pub defense_pct: f32,
    pub speed: f32,
    pub hitbox: Shape,
    #[serde(default = "default_shrink")]
    pub shrink: f32,
    pub contact_damage: f32,
    pub score: u64,
    pub ai: AiBehaviour,
    #[serde(default)]
    pub weapon: Option<WeaponDef>,
    #[serde(default)]
    pub loot_chance: f32,
    /// Collision layer name
    #[serde(default = "default_enemy_layer")]
    pub layer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhaseDef {
    /// Phase begins once HP fraction drops to this value
    pub hp_fraction: f32,
    pub weapon: WeaponDef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub hp: f32,
    #[serde(default)]
    pub shield: f32,
    #[serde(default)]
    pub defense_pct: f32,
    pub speed: f32,
    pub hitbox: Shape,
    #[serde(default = "default_shrink")]
    pub shrink: f32,
    pub contact_damage: f32,
    pub score: u64,
    /// Opening weapon
    pub weapon: WeaponDef,
    /// Later phases, in order of descending `hp_fraction`
    #[serde(default)]
    pub phases: Vec<BossPhaseDef>,
    /// Guaranteed powerup drops on death
    #[serde(default)]
    pub loot_rolls: u32,
}

/// One purchasable entry of a level's spawn pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub enemy_id: String,
    pub cost: f32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    /// Credits per second before the wave multiplier
    pub base_income: f32,
    pub credit_cap: f32,
    pub starting_credits: f32,
    pub pool: Vec<SpawnEntry>,
    pub boss_id: String,
    /// Level time before the boss appears
    pub boss_after_secs: f32,
    /// Skip ahead without fighting the boss once this much score is banked
    #[serde(default)]
    pub score_to_advance: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupDef {
    pub kind: PowerupKind,
    pub weight: f32,
    /// Duration for timed effects; ignored by instant ones
    #[serde(default)]
    pub duration_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyDef {
    /// Real-time gap between purchase rounds
    pub spawn_interval_ms: f32,
    /// Purchase attempts per round
    pub max_purchases: u32,
    /// Hard cap on live enemies
    pub max_live_enemies: usize,
    /// Income oscillates within 1 ± amplitude
    pub wave_amplitude: f32,
    pub wave_period_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboDef {
    /// Kills must land within this window to chain
    pub window_ms: f32,
    /// Multiplier gained per chained kill
    pub step: f32,
    pub max_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyDef {
    /// Added per level index
    pub per_level: f32,
    /// Added per minute of play
    pub per_minute: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaDef {
    pub width: f32,
    pub height: f32,
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed for the session
    pub seed: u64,
    pub arena: ArenaDef,
    pub player: PlayerDef,
    pub enemies: BTreeMap<String, EnemyDef>,
    pub bosses: BTreeMap<String, BossDef>,
    pub levels: Vec<LevelDef>,
    pub powerups: Vec<PowerupDef>,
    pub economy: EconomyDef,
    pub combo: ComboDef,
    pub difficulty: DifficultyDef,
    /// Slow motion after a boss dies
    pub boss_slowmo_ms: f32,
    pub boss_slowmo_scale: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let blaster = WeaponDef {
            pattern: FirePattern::Forward,
            cooldown_ms: 140.0,
            damage: 10.0,
            bullet_speed: 620.0,
            bullet_radius: 4.0,
        };
        let pea_shooter = WeaponDef {
            pattern: FirePattern::Aimed,
            cooldown_ms: 1600.0,
            damage: 12.0,
            bullet_speed: 220.0,
            bullet_radius: 5.0,
        };

        let mut enemies = BTreeMap::new();
        enemies.insert(
            "drone".to_string(),
            EnemyDef {
                hp: 20.0,
                shield: 0.0,
                defense_pct: 0.0,
                speed: 110.0,
                hitbox: Shape::Circle { radius: 14.0 },
                shrink: 1.0,
                contact_damage: 20.0,
                score: 100,
                ai: AiBehaviour::Drifter,
                weapon: None,
                loot_chance: 0.05,
                layer: default_enemy_layer(),
            },
        );
        enemies.insert(
            "weaver".to_string(),
            EnemyDef {
                hp: 30.0,
                shield: 0.0,
                defense_pct: 0.0,
                speed: 90.0,
                hitbox: Shape::Circle { radius: 16.0 },
                shrink: 0.9,
                contact_damage: 20.0,
                score: 150,
                ai: AiBehaviour::Strafer {
                    amplitude: 80.0,
                    frequency: 0.6,
                },
                weapon: Some(pea_shooter),
                loot_chance: 0.08,
                layer: default_enemy_layer(),
            },
        );
        enemies.insert(
            "hunter".to_string(),
            EnemyDef {
                hp: 25.0,
                shield: 10.0,
                defense_pct: 0.0,
                speed: 150.0,
                hitbox: Shape::Circle { radius: 13.0 },
                shrink: 0.9,
                contact_damage: 30.0,
                score: 200,
                ai: AiBehaviour::Chaser { turn_rate: 2.0 },
                weapon: None,
                loot_chance: 0.1,
                layer: default_enemy_layer(),
            },
        );
        enemies.insert(
            "bulwark".to_string(),
            EnemyDef {
                hp: 120.0,
                shield: 40.0,
                defense_pct: 0.3,
                speed: 60.0,
                hitbox: Shape::Rect {
                    half_width: 30.0,
                    half_height: 18.0,
                },
                shrink: 0.95,
                contact_damage: 40.0,
                score: 500,
                ai: AiBehaviour::Turret { hold_y: 160.0 },
                weapon: Some(WeaponDef {
                    pattern: FirePattern::Spread {
                        count: 3,
                        arc_deg: 40.0,
                    },
                    cooldown_ms: 2000.0,
                    damage: 10.0,
                    bullet_speed: 200.0,
                    bullet_radius: 5.0,
                }),
                loot_chance: 0.35,
                layer: default_enemy_layer(),
            },
        );

        let mut bosses = BTreeMap::new();
        bosses.insert(
            "dreadnought".to_string(),
            BossDef {
                hp: 1500.0,
                shield: 300.0,
                defense_pct: 0.2,
                speed: 70.0,
                hitbox: Shape::Rect {
                    half_width: 70.0,
                    half_height: 40.0,
                },
                shrink: 0.85,
                contact_damage: 60.0,
                score: 10_000,
                weapon: WeaponDef {
                    pattern: FirePattern::Spread {
                        count: 5,
                        arc_deg: 60.0,
                    },
                    cooldown_ms: 1200.0,
                    damage: 12.0,
                    bullet_speed: 240.0,
                    bullet_radius: 6.0,
                },
                phases: vec![
                    BossPhaseDef {
                        hp_fraction: 0.66,
                        weapon: WeaponDef {
                            pattern: FirePattern::Radial { count: 12 },
                            cooldown_ms: 1000.0,
                            damage: 12.0,
                            bullet_speed: 200.0,
                            bullet_radius: 6.0,
                        },
                    },
                    BossPhaseDef {
                        hp_fraction: 0.33,
                        weapon: WeaponDef {
                            pattern: FirePattern::Aimed,
                            cooldown_ms: 250.0,
                            damage: 10.0,
                            bullet_speed: 320.0,
                            bullet_radius: 5.0,
                        },
                    },
                ],
                loot_rolls: 3,
            },
        );

        let levels = vec![
            LevelDef {
                name: "Outer Belt".to_string(),
                base_income: 4.0,
                credit_cap: 30.0,
                starting_credits: 6.0,
                pool: vec![
                    SpawnEntry {
                        enemy_id: "drone".to_string(),
                        cost: 2.0,
                        weight: 6.0,
                    },
                    SpawnEntry {
                        enemy_id: "weaver".to_string(),
                        cost: 4.0,
                        weight: 3.0,
                    },
                    SpawnEntry {
                        enemy_id: "hunter".to_string(),
                        cost: 5.0,
                        weight: 1.0,
                    },
                ],
                boss_id: "dreadnought".to_string(),
                boss_after_secs: 90.0,
                score_to_advance: None,
            },
            LevelDef {
                name: "Shipyards".to_string(),
                base_income: 6.0,
                credit_cap: 50.0,
                starting_credits: 10.0,
                pool: vec![
                    SpawnEntry {
                        enemy_id: "drone".to_string(),
                        cost: 2.0,
                        weight: 3.0,
                    },
                    SpawnEntry {
                        enemy_id: "weaver".to_string(),
                        cost: 4.0,
                        weight: 4.0,
                    },
                    SpawnEntry {
                        enemy_id: "hunter".to_string(),
                        cost: 5.0,
                        weight: 3.0,
                    },
                    SpawnEntry {
                        enemy_id: "bulwark".to_string(),
                        cost: 14.0,
                        weight: 1.0,
                    },
                ],
                boss_id: "dreadnought".to_string(),
                boss_after_secs: 120.0,
                score_to_advance: None,
            },
        ];

        let powerups = vec![
            PowerupDef {
                kind: PowerupKind::RapidFire,
                weight: 3.0,
                duration_ms: 8000.0,
            },
            PowerupDef {
                kind: PowerupKind::SpreadShot,
                weight: 3.0,
                duration_ms: 8000.0,
            },
            PowerupDef {
                kind: PowerupKind::ShieldRecharge,
                weight: 2.0,
                duration_ms: 0.0,
            },
            PowerupDef {
                kind: PowerupKind::Heal,
                weight: 2.0,
                duration_ms: 0.0,
            },
            PowerupDef {
                kind: PowerupKind::Invincibility,
                weight: 0.5,
                duration_ms: 4000.0,
            },
            PowerupDef {
                kind: PowerupKind::ScoreBonus,
                weight: 1.5,
                duration_ms: 0.0,
            },
        ];

        Self {
            seed: 0x5EED,
            arena: ArenaDef {
                width: ARENA_WIDTH,
                height: ARENA_HEIGHT,
            },
            player: PlayerDef {
                hp: 100.0,
                shield: 50.0,
                defense_pct: 0.0,
                speed: 280.0,
                hitbox: Shape::Circle { radius: 12.0 },
                shrink: 0.5,
                contact_damage: 40.0,
                hit_invincibility_ms: 1000.0,
                spawn_invincibility_ms: 2000.0,
                weapon: blaster,
            },
            enemies,
            bosses,
            levels,
            powerups,
            economy: EconomyDef {
                spawn_interval_ms: 1500.0,
                max_purchases: 3,
                max_live_enemies: 24,
                wave_amplitude: 0.5,
                wave_period_secs: 30.0,
            },
            combo: ComboDef {
                window_ms: 2500.0,
                step: 0.1,
                max_multiplier: 4.0,
            },
            difficulty: DifficultyDef {
                per_level: 0.25,
                per_minute: 0.1,
                max: 3.0,
            },
            boss_slowmo_ms: 1500.0,
            boss_slowmo_scale: 0.4,
        }
    }
}

fn check_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

fn check_shape(field: &str, shape: &Shape) -> Result<(), ConfigError> {
    match *shape {
        Shape::Circle { radius } => check_positive(field, radius),
        Shape::Rect {
            half_width,
            half_height,
        } => {
            check_positive(field, half_width)?;
            check_positive(field, half_height)
        }
    }
}

fn check_weapon(field: &str, weapon: &WeaponDef) -> Result<(), ConfigError> {
    check_positive(&format!("{field}.cooldown_ms"), weapon.cooldown_ms)?;
    check_non_negative(&format!("{field}.damage"), weapon.damage)?;
    check_positive(&format!("{field}.bullet_speed"), weapon.bullet_speed)?;
    check_positive(&format!("{field}.bullet_radius"), weapon.bullet_radius)?;
    match weapon.pattern {
        FirePattern::Spread { count, .. } | FirePattern::Radial { count } if count == 0 => Err(
            ConfigError::invalid(format!("{field}.pattern"), "bullet count must be > 0"),
        ),
        _ => Ok(()),
    }
}

impl GameConfig {
    /// Parse a JSON balance table. Missing top-level sections use defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON balance table from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded balance table from {} ({} levels, {} enemies)",
            path.as_ref().display(),
            config.levels.len(),
            config.enemies.len()
        );
        Ok(config)
    }

    /// Enforce every rule the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("arena.width", self.arena.width)?;
        check_positive("arena.height", self.arena.height)?;

        check_positive("player.hp", self.player.hp)?;
        check_non_negative("player.shield", self.player.shield)?;
        check_positive("player.speed", self.player.speed)?;
        check_shape("player.hitbox", &self.player.hitbox)?;
        check_non_negative("player.hit_invincibility_ms", self.player.hit_invincibility_ms)?;
        check_weapon("player.weapon", &self.player.weapon)?;

        for (id, enemy) in &self.enemies {
            check_positive(&format!("enemies.{id}.hp"), enemy.hp)?;
            check_non_negative(&format!("enemies.{id}.shield"), enemy.shield)?;
            check_shape(&format!("enemies.{id}.hitbox"), &enemy.hitbox)?;
            if let Some(weapon) = &enemy.weapon {
                check_weapon(&format!("enemies.{id}.weapon"), weapon)?;
            }
            enemy.layer.parse::<CollisionLayer>()?;
        }

        for (id, boss) in &self.bosses {
            check_positive(&format!("bosses.{id}.hp"), boss.hp)?;
            check_shape(&format!("bosses.{id}.hitbox"), &boss.hitbox)?;
            check_weapon(&format!("bosses.{id}.weapon"), &boss.weapon)?;
            for (i, phase) in boss.phases.iter().enumerate() {
                check_weapon(&format!("bosses.{id}.phases[{i}].weapon"), &phase.weapon)?;
                if !(0.0..1.0).contains(&phase.hp_fraction) {
                    return Err(ConfigError::invalid(
                        format!("bosses.{id}.phases[{i}].hp_fraction"),
                        "must be in [0, 1)",
                    ));
                }
            }
        }

        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.pool.is_empty() {
                return Err(ConfigError::EmptySpawnPool { level: index });
            }
            check_non_negative(&format!("levels[{index}].base_income"), level.base_income)?;
            check_non_negative(&format!("levels[{index}].credit_cap"), level.credit_cap)?;
            check_non_negative(
                &format!("levels[{index}].starting_credits"),
                level.starting_credits,
            )?;
            if level.starting_credits > level.credit_cap {
                return Err(ConfigError::invalid(
                    format!("levels[{index}].starting_credits"),
                    "exceeds credit_cap",
                ));
            }
            for entry in &level.pool {
                if !self.enemies.contains_key(&entry.enemy_id) {
                    return Err(ConfigError::UnknownEnemy(entry.enemy_id.clone()));
                }
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        item: entry.enemy_id.clone(),
                        weight: entry.weight,
                    });
                }
                check_positive(&format!("levels[{index}].pool.{}.cost", entry.enemy_id), entry.cost)?;
            }
            if level.pool.iter().all(|e| e.weight <= 0.0) {
                return Err(ConfigError::EmptySpawnPool { level: index });
            }
            if !self.bosses.contains_key(&level.boss_id) {
                return Err(ConfigError::UnknownBoss(level.boss_id.clone()));
            }
        }

        for powerup in &self.powerups {
            if !powerup.weight.is_finite() || powerup.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    item: format!("{:?}", powerup.kind),
                    weight: powerup.weight,
                });
            }
        }

        check_positive("economy.spawn_interval_ms", self.economy.spawn_interval_ms)?;
        if self.economy.max_purchases == 0 {
            return Err(ConfigError::invalid("economy.max_purchases", "must be > 0"));
        }
        if !(0.0..1.0).contains(&self.economy.wave_amplitude) {
            return Err(ConfigError::invalid("economy.wave_amplitude", "must be in [0, 1)"));
        }
        check_positive("economy.wave_period_secs", self.economy.wave_period_secs)?;
        check_positive("combo.window_ms", self.combo.window_ms)?;
        if self.combo.max_multiplier < 1.0 {
            return Err(ConfigError::invalid("combo.max_multiplier", "must be >= 1"));
        }
        check_positive("boss_slowmo_scale", self.boss_slowmo_scale)?;

        Ok(())
    }

    /// Duration configured for a powerup kind
    pub fn powerup_duration(&self, kind: PowerupKind) -> f32 {
        self.powerups
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.duration_ms)
            .unwrap_or(0.0)
    }

    /// Collision layer of an enemy type. Validated names always parse.
    pub fn enemy_layer(&self, def: &EnemyDef) -> CollisionLayer {
        def.layer.parse().unwrap_or(CollisionLayer::Enemy)
    }
}
