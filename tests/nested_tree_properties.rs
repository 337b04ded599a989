use people_etl::core::nested::NestedTree;
use people_etl::parse_csv;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn segment() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

// 路徑集合中不能有一條是另一條的前綴
fn prefix_free(paths: &[Vec<String>]) -> bool {
    paths.iter().enumerate().all(|(i, a)| {
        paths
            .iter()
            .enumerate()
            .all(|(j, b)| i == j || a == b || !b.starts_with(a))
    })
}

proptest! {
    #[test]
    fn flatten_then_rebuild_keeps_every_leaf(
        entries in prop::collection::vec(
            (prop::collection::vec(segment(), 1..4), "[a-zA-Z0-9 ]{0,8}"),
            1..12,
        )
    ) {
        let paths: Vec<Vec<String>> = entries.iter().map(|(p, _)| p.clone()).collect();
        prop_assume!(prefix_free(&paths));

        let flat: Vec<(String, String)> = entries
            .iter()
            .map(|(p, v)| (p.join("."), v.clone()))
            .collect();
        let tree = NestedTree::from_flat(flat.clone()).unwrap();

        // 重複路徑以最後一次為準
        let expected: BTreeMap<String, String> = flat.into_iter().collect();
        let flattened: BTreeMap<String, String> = tree.flatten().into_iter().collect();
        prop_assert_eq!(&flattened, &expected);

        let rebuilt = NestedTree::from_flat(tree.flatten()).unwrap();
        prop_assert_eq!(rebuilt, tree);
    }

    #[test]
    fn one_record_per_row_in_input_order(
        rows in prop::collection::vec(("[A-Z][a-z]{1,6}", "[A-Z][a-z]{1,6}", 1u32..120), 1..20)
    ) {
        let mut csv = String::from("name.firstName,name.lastName,age\n");
        for (first, last, age) in &rows {
            csv.push_str(&format!("{},{},{}\n", first, last, age));
        }

        let people = parse_csv(&csv).unwrap();
        prop_assert_eq!(people.len(), rows.len());
        for (person, (first, last, age)) in people.iter().zip(&rows) {
            prop_assert_eq!(&person.name.first_name, first);
            prop_assert_eq!(&person.name.last_name, last);
            prop_assert_eq!(person.age, *age);
        }
        prop_assert_eq!(parse_csv(&csv).unwrap(), people);
    }
}
