mod schema;

pub use schema::{
    Column, ForeignKey, ForeignKeyOnChange, Schema, SqlType, Table, DEFAULT_TIMESTAMP,
};
