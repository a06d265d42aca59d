//! Diesel table definitions for the local SQLite store.
//!
//! These definitions must match [`SCHEMA_SQL`] exactly. There is no
//! migration runner: tables are created on first use and later changes
//! must be additive.

/// DDL executed by `SqliteStore::initialize`; every statement is idempotent.
pub(crate) const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS factions (
    id INTEGER PRIMARY KEY NOT NULL,
    parent_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    discontinued INTEGER NOT NULL DEFAULT 0,
    logo TEXT
);
CREATE TABLE IF NOT EXISTS ammunitions (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    wiki TEXT
);
CREATE TABLE IF NOT EXISTS weapons (
    weapon_key TEXT PRIMARY KEY NOT NULL,
    id INTEGER NOT NULL,
    name TEXT NOT NULL,
    mode TEXT,
    weapon_type TEXT,
    wiki TEXT,
    ammunition INTEGER,
    burst TEXT,
    damage TEXT,
    saving TEXT,
    saving_num TEXT,
    profile TEXT,
    properties_json TEXT NOT NULL DEFAULT '[]',
    distance_json TEXT
);
CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    wiki TEXT
);
CREATE TABLE IF NOT EXISTS equips (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    wiki TEXT
);
CREATE TABLE IF NOT EXISTS hack_programs (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    opponent TEXT,
    special TEXT,
    damage TEXT,
    attack TEXT,
    burst TEXT,
    extra TEXT,
    skill_type_json TEXT NOT NULL DEFAULT '[]',
    devices_json TEXT NOT NULL DEFAULT '[]',
    target_json TEXT NOT NULL DEFAULT '[]'
);
CREATE TABLE IF NOT EXISTS martial_arts (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    opponent TEXT,
    damage TEXT,
    attack TEXT,
    burst TEXT
);
CREATE TABLE IF NOT EXISTS metachemistry (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS booty (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    value TEXT
);
CREATE TABLE IF NOT EXISTS army_snapshots (
    faction_id INTEGER PRIMARY KEY NOT NULL,
    version TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    raw_json TEXT NOT NULL,
    reinforcements_json TEXT,
    filters_json TEXT,
    fireteams_json TEXT,
    relations_json TEXT,
    specops_json TEXT,
    fireteam_chart_json TEXT
);
CREATE TABLE IF NOT EXISTS army_units (
    unit_key TEXT PRIMARY KEY NOT NULL,
    faction_id INTEGER NOT NULL,
    unit_id INTEGER NOT NULL,
    id_army INTEGER,
    position INTEGER NOT NULL,
    canonical INTEGER NOT NULL,
    isc TEXT NOT NULL,
    isc_abbr TEXT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    profile_groups_json TEXT NOT NULL DEFAULT '[]',
    options_json TEXT,
    filters_json TEXT,
    factions_json TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS army_units_faction_idx ON army_units (faction_id, position);
CREATE TABLE IF NOT EXISTS army_resume (
    resume_key TEXT PRIMARY KEY NOT NULL,
    faction_id INTEGER NOT NULL,
    unit_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    id_army INTEGER,
    isc TEXT NOT NULL,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    logo TEXT,
    unit_type INTEGER,
    category INTEGER
);
CREATE INDEX IF NOT EXISTS army_resume_faction_idx ON army_resume (faction_id, position);
CREATE TABLE IF NOT EXISTS app_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL
);
";

diesel::table! {
    /// Factions from the metadata document; replaced on every import.
    factions (id) {
        id -> BigInt,
        /// Equal to `id` for a vanilla faction.
        parent_id -> BigInt,
        name -> Text,
        slug -> Text,
        discontinued -> Bool,
        logo -> Nullable<Text>,
    }
}

diesel::table! {
    ammunitions (id) {
        id -> BigInt,
        name -> Text,
        wiki -> Nullable<Text>,
    }
}

diesel::table! {
    /// Weapon fire-mode variants keyed by the encoded `(id, name, mode)`.
    weapons (weapon_key) {
        weapon_key -> Text,
        id -> BigInt,
        name -> Text,
        mode -> Nullable<Text>,
        weapon_type -> Nullable<Text>,
        wiki -> Nullable<Text>,
        ammunition -> Nullable<BigInt>,
        burst -> Nullable<Text>,
        damage -> Nullable<Text>,
        saving -> Nullable<Text>,
        saving_num -> Nullable<Text>,
        profile -> Nullable<Text>,
        properties_json -> Text,
        distance_json -> Nullable<Text>,
    }
}

diesel::table! {
    skills (id) {
        id -> BigInt,
        name -> Text,
        wiki -> Nullable<Text>,
    }
}

diesel::table! {
    equips (id) {
        id -> BigInt,
        name -> Text,
        wiki -> Nullable<Text>,
    }
}

diesel::table! {
    /// Hacking programs; the publisher gives them no id.
    hack_programs (row_id) {
        row_id -> BigInt,
        name -> Text,
        opponent -> Nullable<Text>,
        special -> Nullable<Text>,
        damage -> Nullable<Text>,
        attack -> Nullable<Text>,
        burst -> Nullable<Text>,
        extra -> Nullable<Text>,
        skill_type_json -> Text,
        devices_json -> Text,
        target_json -> Text,
    }
}

diesel::table! {
    martial_arts (row_id) {
        row_id -> BigInt,
        name -> Text,
        opponent -> Nullable<Text>,
        damage -> Nullable<Text>,
        attack -> Nullable<Text>,
        burst -> Nullable<Text>,
    }
}

diesel::table! {
    metachemistry (id) {
        id -> BigInt,
        name -> Text,
        value -> Nullable<Text>,
    }
}

diesel::table! {
    booty (id) {
        id -> BigInt,
        name -> Text,
        value -> Nullable<Text>,
    }
}

diesel::table! {
    /// One row per faction holding the last imported army document.
    army_snapshots (faction_id) {
        faction_id -> BigInt,
        version -> Text,
        /// RFC 3339 UTC timestamp.
        imported_at -> Text,
        raw_json -> Text,
        reinforcements_json -> Nullable<Text>,
        filters_json -> Nullable<Text>,
        fireteams_json -> Nullable<Text>,
        relations_json -> Nullable<Text>,
        specops_json -> Nullable<Text>,
        fireteam_chart_json -> Nullable<Text>,
    }
}

diesel::table! {
    /// Units keyed by the encoded `(faction_id, unit_id, id_army, slug)`.
    army_units (unit_key) {
        unit_key -> Text,
        faction_id -> BigInt,
        unit_id -> BigInt,
        id_army -> Nullable<BigInt>,
        /// Index in the source document.
        position -> BigInt,
        canonical -> BigInt,
        isc -> Text,
        isc_abbr -> Nullable<Text>,
        name -> Text,
        slug -> Text,
        profile_groups_json -> Text,
        options_json -> Nullable<Text>,
        filters_json -> Nullable<Text>,
        factions_json -> Text,
    }
}

diesel::table! {
    /// Listing rows keyed by the encoded `(faction_id, unit_id, slug)`.
    army_resume (resume_key) {
        resume_key -> Text,
        faction_id -> BigInt,
        unit_id -> BigInt,
        position -> BigInt,
        id_army -> Nullable<BigInt>,
        isc -> Text,
        name -> Text,
        slug -> Text,
        logo -> Nullable<Text>,
        unit_type -> Nullable<BigInt>,
        category -> Nullable<BigInt>,
    }
}

diesel::table! {
    app_settings (id) {
        id -> BigInt,
        key -> Text,
        value -> Text,
    }
}
