use quote_core::Vehicle;

use crate::config::PortalConfig;

/// Instruction templates for the Qualitas agent portal.
pub struct PhasePrompts;

impl PhasePrompts {
    pub fn navigation(portal: &PortalConfig) -> String {
        format!(
            r#"Navigate to the vehicle selection form on Qualitas Seguros portal.

STEPS:
1. Login at {login_url}
   Credentials: Clave: {agent_key}, Cuenta: {account}, Contraseña: {password}

2. Click "Cotizar" button
   **CRITICAL**: This opens a NEW TAB - use switch_tab immediately

3. Select "Residente", click Next

4. Select "Autos", click Next

5. STOP when you see the vehicle search box

IMPORTANT:
- Wait 2-3 seconds after each action
- NEW TAB opens after Cotizar - must switch_tab
- Use scroll if needed"#,
            login_url = portal.login_url,
            agent_key = portal.agent_key,
            account = portal.account,
            password = portal.password,
        )
    }

    pub fn extraction(vehicle: &Vehicle) -> String {
        format!(
            r#"Type "{query}" in the vehicle search box.
Wait 2 seconds for the dropdown suggestions to appear.
Use extract_page_content action to get ALL visible dropdown options.
Return the complete list of available vehicles shown.

STOP after extracting the list."#,
            query = vehicle.search_query()
        )
    }

    pub fn selection(vehicle: &Vehicle) -> String {
        format!(
            r#"From the dropdown list, select the vehicle that BEST matches these specifications:
- Brand: {brand}
- Model: {model}
- Year: {year}
- Engine: {engine}
- Doors: {doors}

SELECTION CRITERIA:
- Prioritize: Year {year}, semantic matching
- The exact wording may differ (e.g., "180 CP" means 180hp)
- Focus on semantic matching, not exact string matching
- Use click_element action to select the best match

- Add the zip code: {zip_code}
- Use the click_element action to select the zone depicted in the zip code. It should be a single option in a dropdown.

- Use the click_element action to select the "siguiente" button.

STOP after selecting the vehicle."#,
            brand = vehicle.brand,
            model = vehicle.model,
            year = vehicle.year,
            engine = vehicle.engine_or_default(),
            doors = vehicle.doors_or_default(),
            zip_code = vehicle.zip_code_or_default(),
        )
    }

    pub fn completion() -> String {
        r#"Complete the insurance quote form and download PDF.

STEPS:
1. Use scroll action to scroll down 2 pages to see all "Datos de cotización" options
2. Keep defaults in "Datos de cotización", use click_element to select "siguiente"
3. Use scroll action to scroll down 2 pages to view "Coberturas" section
4. Don't select any coverage options, use click_element to select "siguiente"
5. Use scroll action to scroll down 2 pages to locate "imprimir" button
6. Use click_element action to select "imprimir" - opens new tab with PDF

IMPORTANT:
- Use scroll action explicitly between each major step
- Wait 2-3 seconds after scrolling before clicking
- Scroll 2 pages = enough to see full form sections"#
            .to_string()
    }
}
