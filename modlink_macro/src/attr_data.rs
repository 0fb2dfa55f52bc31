use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::{spanned::Spanned, *};

/// Where the thunk slot gets its address from.
pub enum Source {
	/// `library = <path>`: looked up in a `LibLock` on first use.
	Library(syn::Path),
	/// `target = <path>`: a function bound at link time.
	Target(syn::Path),
}

pub struct AttrData {
	pub source: Source,
	pub link_name: Option<(String, Span)>,
	pub naked: bool,
}

impl TryFrom<Punctuated<Expr, Token!(,)>> for AttrData {
	type Error = syn::Error;
	fn try_from(value: Punctuated<Expr, Token!(,)>) -> Result<Self> {
		let mut source: Option<Source> = None;
		let mut link_name: Option<(String, Span)> = None;
		let mut naked = false;
		let mut errors = vec![];
		const EXPECTED_KW: &str = "Expected `library`, `target`, `link_name`, or `naked`.";

		for expr in value.iter() {
			match expr {
				Expr::Assign(assign) => {
					let (assign_left, assign_right) = (assign.left.as_ref(), assign.right.as_ref());

					let Expr::Path(ExprPath { path, .. }) = assign_left else {
						errors.push(Error::new(assign_left.span(), EXPECTED_KW));
						continue;
					};
					if path.is_ident("library") || path.is_ident("target") {
						// Branch for syntax: #[thunk(library = <path>)] or #[thunk(target = <path>)]
						match assign_right {
							Expr::Path(ExprPath { path: right, .. }) => {
								if source.is_some() {
									errors.push(Error::new(
										assign.span(),
										"`library` or `target` is already defined",
									));
								} else if path.is_ident("library") {
									source = Some(Source::Library(right.clone()));
								} else {
									source = Some(Source::Target(right.clone()));
								}
							}
							right => errors.push(Error::new(right.span(), "Expected path.")),
						}
					} else if path.is_ident("link_name") {
						// Branch for syntax: #[thunk(link_name = <string>)]
						match assign_right {
							Expr::Lit(ExprLit {
								lit: Lit::Str(val), ..
							}) => {
								if link_name.is_none() {
									link_name = Some((val.value(), assign.span()));
								} else {
									errors.push(Error::new(
										assign.span(),
										"link_name is already defined",
									));
								}
							}
							right => errors.push(Error::new(right.span(), "Expected string.")),
						}
					} else {
						errors.push(Error::new(assign_left.span(), EXPECTED_KW));
					}
				}
				// Branch for syntax: #[thunk(naked)]
				Expr::Path(ExprPath { path, .. }) if path.is_ident("naked") => {
					if naked {
						errors.push(Error::new(path.span(), "naked is already defined"));
					}
					naked = true;
				}

				// Branch for everything else.
				expr => errors.push(Error::new(expr.span(), EXPECTED_KW)),
			}
		}
		if source.is_none() {
			errors.push(Error::new(
				value.span(),
				"No symbol source detected. Suggest using: `library = <path>`, or `target = <path>`.",
			));
		}

		// if there are any errors this will immediately combine and return early.
		if let Some(mut main_err) = errors.pop() {
			for err in errors {
				main_err.combine(err);
			}
			Err(main_err)
		} else {
			Ok(Self {
				source: source.ok_or_else(|| Error::new(value.span(), EXPECTED_KW))?,
				link_name,
				naked,
			})
		}
	}
}
