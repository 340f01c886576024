use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{self, Ident};

/// This macro is added before a method of the `Table` struct in the impl block.
/// Use this macro to first check if current game phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(PlaceBets)]` will make a method first check
/// if current game phase is `PlaceBets`. If not, the method returns
/// `Err(Error::WrongPhase { .. })` before touching any state.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = syn::parse(item).expect("allowed_phase only applies to methods");
    let phase: Ident = syn::parse(attr).expect("allowed_phase expects a single GamePhase variant");
    let function_name = ast.sig.ident.to_string();

    let early_return = phase_guard(&phase, &function_name);
    let early_return: syn::Stmt =
        syn::parse2(early_return).expect("phase guard must be a valid statement");
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}

fn phase_guard(phase: &Ident, function_name: &str) -> TokenStream2 {
    quote! {
        if self.current_game_phase != crate::simulation::GamePhase::#phase {
            return Err(crate::Error::WrongPhase {
                operation: #function_name,
                expected: crate::simulation::GamePhase::#phase,
                actual: self.current_game_phase,
            });
        }
    }
}
