//! Static whitelist of the tables and columns a placeholder may be bound to.
//!
//! The declaration order matters: `table_for_column` returns the first table
//! that declares a column, so a column name shared by several tables (for
//! example `name`) resolves to the earliest declaration. Mappings always store
//! their table explicitly, so this reverse lookup is only used to pre-fill the
//! table of a row the operator picked by column.

use common::model::schema::{SchemaColumn, SchemaTable};
use regex::Regex;
use std::sync::LazyLock;

/// Root case table. Every other table joins to it through `krd_id`.
pub const ROOT_TABLE: &str = "krd";

/// How a column's value is stored and how it is rendered into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    /// Stored as `YYYY-MM-DD`, rendered as `DD.MM.YYYY`.
    Date,
    Timestamp,
    /// Stored as 0/1, rendered as `true`/`false`.
    Flag,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Number | ColumnKind::Flag => "INTEGER",
            ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column the case identifier is matched against.
    pub fn join_column(&self) -> &'static str {
        join_column(self.name)
    }
}

const fn text(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnKind::Text,
    }
}

const fn number(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnKind::Number,
    }
}

const fn date(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnKind::Date,
    }
}

const fn timestamp(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnKind::Timestamp,
    }
}

const fn flag(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnKind::Flag,
    }
}

const NAME_ONLY: &[ColumnDef] = &[text("name")];

pub static TABLES: &[TableDef] = &[
    TableDef {
        name: "social_data",
        columns: &[
            text("surname"),
            text("name"),
            text("patronymic"),
            date("birth_date"),
            text("birth_place_town"),
            text("birth_place_district"),
            text("birth_place_region"),
            text("birth_place_country"),
            text("tab_number"),
            text("personal_number"),
            number("category_id"),
            number("rank_id"),
            text("drafted_by_commissariat"),
            date("draft_date"),
            text("povsk"),
            date("selection_date"),
            text("education"),
            text("criminal_record"),
            text("social_media_account"),
            text("bank_card_number"),
            text("passport_series"),
            text("passport_number"),
            date("passport_issue_date"),
            text("passport_issued_by"),
            text("military_id_series"),
            text("military_id_number"),
            date("military_id_issue_date"),
            text("military_id_issued_by"),
            text("appearance_features"),
            text("personal_marks"),
            text("federal_search_info"),
            text("military_contacts"),
            text("relatives_info"),
        ],
    },
    TableDef {
        name: "addresses",
        columns: &[
            text("region"),
            text("district"),
            text("town"),
            text("street"),
            text("house"),
            text("building"),
            text("letter"),
            text("apartment"),
            text("room"),
            date("check_date"),
            text("check_result"),
        ],
    },
    TableDef {
        name: "service_places",
        columns: &[
            text("place_name"),
            number("military_unit_id"),
            number("garrison_id"),
            number("position_id"),
            text("commanders"),
            text("postal_index"),
            text("postal_region"),
            text("postal_district"),
            text("postal_town"),
            text("postal_street"),
            text("postal_house"),
            text("postal_building"),
            text("postal_letter"),
            text("postal_apartment"),
            text("postal_room"),
            text("place_contacts"),
        ],
    },
    TableDef {
        name: "users",
        columns: &[
            text("username"),
            text("full_name"),
            text("email"),
            number("role_id"),
            flag("is_active"),
            timestamp("created_at"),
            timestamp("last_login"),
        ],
    },
    TableDef {
        name: "statuses",
        columns: NAME_ONLY,
    },
    TableDef {
        name: "ranks",
        columns: NAME_ONLY,
    },
    TableDef {
        name: "categories",
        columns: NAME_ONLY,
    },
    TableDef {
        name: "military_units",
        columns: NAME_ONLY,
    },
    TableDef {
        name: "garrisons",
        columns: NAME_ONLY,
    },
    TableDef {
        name: "positions",
        columns: NAME_ONLY,
    },
    TableDef {
        name: ROOT_TABLE,
        columns: &[
            number("id"),
            number("status_id"),
            number("last_service_place_id"),
        ],
    },
];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

/// True when `name` consists only of ASCII letters, digits and underscores.
pub fn is_safe_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|t| t.name)
}

pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}

/// Columns of `table` in declaration order.
pub fn columns(table_name: &str) -> Option<Vec<&'static str>> {
    table(table_name).map(|t| t.columns.iter().map(|c| c.name).collect())
}

/// Whitelist check: the column definition when `(table, column)` is a legal
/// substitution source.
pub fn column(table_name: &str, column_name: &str) -> Option<&'static ColumnDef> {
    table(table_name).and_then(|t| t.column(column_name))
}

/// First table (in declaration order) declaring `column_name`.
pub fn table_for_column(column_name: &str) -> Option<&'static str> {
    TABLES
        .iter()
        .find(|t| t.column(column_name).is_some())
        .map(|t| t.name)
}

pub fn join_column(table_name: &str) -> &'static str {
    if table_name == ROOT_TABLE {
        "id"
    } else {
        "krd_id"
    }
}

pub fn describe() -> Vec<SchemaTable> {
    TABLES
        .iter()
        .map(|t| SchemaTable {
            name: t.name.to_string(),
            columns: t.columns.iter().map(|c| c.name.to_string()).collect(),
        })
        .collect()
}

/// Every legal `(table, column)` pair, table by table.
pub fn all_columns() -> Vec<SchemaColumn> {
    TABLES
        .iter()
        .flat_map(|t| {
            t.columns.iter().map(move |c| SchemaColumn {
                table_name: t.name.to_string(),
                column_name: c.name.to_string(),
            })
        })
        .collect()
}
