//! Property-based tests for schema validation and bulk writes
//!
//! These tests verify through generated inputs that:
//! - Table schemas reject primary keys naming unknown columns
//! - Bulk inserts read back exactly what was written
//! - Colliding keys resolve to the last row written, across chunk boundaries
//! - Table creation is idempotent

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest_derive::Arbitrary;
    use reata::{row, Client, ClientConfig, ReataError, Row, TableSchema, UpdateMethod};
    use std::collections::{BTreeMap, HashSet};

    // Test infrastructure

    #[derive(Debug, Clone, Copy, Arbitrary)]
    enum Method {
        Insert,
        Upsert,
        Replace,
    }

    impl From<Method> for UpdateMethod {
        fn from(method: Method) -> Self {
            match method {
                Method::Insert => UpdateMethod::Insert,
                Method::Upsert => UpdateMethod::Upsert,
                Method::Replace => UpdateMethod::Replace,
            }
        }
    }

    fn people_schema() -> TableSchema {
        TableSchema::new("people", [("name", "TEXT NOT NULL"), ("age", "INTEGER")], ["name"])
            .unwrap()
    }

    fn people_client(max_bind_params: usize) -> Client {
        let connection = Client::open_in_memory().unwrap().into_connection();
        let mut client = Client::with_config(
            connection,
            ClientConfig {
                max_bind_params,
                ..ClientConfig::default()
            },
        );
        client.use_database("props", true).unwrap();
        client.create_table(&people_schema()).unwrap();
        client
    }

    fn read_people(client: &Client) -> BTreeMap<String, i64> {
        client
            .fetch_all("people", Some(&["name", "age"]))
            .unwrap()
            .into_iter()
            .map(|row| {
                (
                    row[0].as_str().unwrap().to_string(),
                    row[1].as_i64().unwrap(),
                )
            })
            .collect()
    }

    fn arb_column_name() -> impl Strategy<Value = String> {
        "c_[a-z0-9_]{0,12}"
    }

    fn arb_people() -> impl Strategy<Value = BTreeMap<String, i64>> {
        prop::collection::btree_map("[A-Za-z][A-Za-z ']{0,15}", any::<i64>(), 0..40)
    }

    proptest! {
        #[test]
        fn test_unknown_primary_key_is_rejected(
            columns in prop::collection::btree_set(arb_column_name(), 1..8),
            key in arb_column_name(),
        ) {
            prop_assume!(!columns.contains(&key));
            let result = TableSchema::new(
                "t",
                columns.iter().map(|c| (c.clone(), "TEXT".to_string())),
                [key],
            );
            prop_assert!(matches!(result, Err(ReataError::Validation(_))));
        }

        #[test]
        fn test_bulk_insert_reads_back(people in arb_people(), method in any::<Method>()) {
            let client = people_client(ClientConfig::default().max_bind_params);
            let rows: Vec<Row> = people
                .iter()
                .map(|(name, age)| row![name.as_str(), *age])
                .collect();
            let changed = client
                .bulk_insert("people", &["name", "age"], &rows, method.into())
                .unwrap();
            prop_assert_eq!(changed, rows.len());
            prop_assert_eq!(
                client.fetch_all("people", Some(&["name", "age"])).unwrap(),
                rows
            );
        }

        #[test]
        fn test_last_row_wins_across_chunks(
            writes in prop::collection::vec((0u8..6, any::<i64>()), 1..30),
            max_bind_params in 2usize..9,
            upsert in any::<bool>(),
        ) {
            let client = people_client(max_bind_params);
            let method = if upsert { UpdateMethod::Upsert } else { UpdateMethod::Replace };
            let rows: Vec<Row> = writes
                .iter()
                .map(|(key, age)| row![format!("k{key}"), *age])
                .collect();
            client.bulk_insert("people", &["name", "age"], &rows, method).unwrap();

            let expected: BTreeMap<String, i64> = writes
                .iter()
                .map(|(key, age)| (format!("k{key}"), *age))
                .collect();
            prop_assert_eq!(read_people(&client), expected);
        }

        #[test]
        fn test_virtual_columns_only_shrink_the_count(
            columns in prop::collection::btree_set(arb_column_name(), 1..8),
            generated in prop::collection::vec(any::<bool>(), 8),
        ) {
            let columns: Vec<String> = columns.into_iter().collect();
            // The key column always stays concrete.
            let definitions: Vec<(String, String)> = columns
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let definition = if i > 0 && generated[i] {
                        "INTEGER GENERATED ALWAYS AS (1) STORED"
                    } else {
                        "INTEGER"
                    };
                    (name.clone(), definition.to_string())
                })
                .collect();
            let virtual_count = definitions
                .iter()
                .filter(|(_, d)| d.contains("GENERATED"))
                .count();
            let schema = TableSchema::new("shapes", definitions, [columns[0].clone()]).unwrap();

            let mut client = Client::open_in_memory().unwrap();
            client.use_database("props", true).unwrap();
            client.create_table(&schema).unwrap();

            let all = client.column_count("shapes", true).unwrap();
            let concrete = client.column_count("shapes", false).unwrap();
            prop_assert_eq!(all, columns.len());
            prop_assert_eq!(concrete, columns.len() - virtual_count);
            prop_assert!(all >= concrete);
        }

        #[test]
        fn test_create_table_twice_is_idempotent(
            people in arb_people(),
            method in any::<Method>(),
        ) {
            let client = people_client(ClientConfig::default().max_bind_params);
            let rows: Vec<Row> = people
                .iter()
                .map(|(name, age)| row![name.as_str(), *age])
                .collect();
            client.bulk_insert("people", &["name", "age"], &rows, method.into()).unwrap();

            client.create_table(&people_schema()).unwrap();
            prop_assert_eq!(
                client.table_names().unwrap(),
                HashSet::from(["people".to_string()])
            );
            prop_assert_eq!(read_people(&client), people);
        }
    }
}
