use modlink::export::{AliasTable, Signature};

fn main() {
	let table = AliasTable::new(1).alias(
		Signature::c("alias_cdylib_entry"),
		Signature::c("alias_cdylib_target"),
	);
	if let Err(err) = table.emit() {
		panic!("{err}");
	}
}
