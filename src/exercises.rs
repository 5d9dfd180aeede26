//! Exercise bank: section catalog and procedural generation of each section's exercises.
//!
//! Every section has `SECTION_SIZE` slots. The template used by a slot is a pure function
//! of its index (`i mod k`) and so is its difficulty tier; only numeric operands are drawn
//! from the random source. Seeding the RNG makes a bank reproducible bit for bit.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::domain::{Difficulty, Exercise, ExpectedResult, ResultType, SectionId};

pub const SECTION_SIZE: usize = 100;

const STARTER_CODE: &str = "# Escribe tu código aquí\n";
const FUNCTION_STARTER_CODE: &str = "# Define la función aquí\n\n# Llama a la función\n";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
  pub id: SectionId,
  pub title: &'static str,
  pub description: &'static str,
  pub icon: &'static str,
  pub total_exercises: usize,
  pub estimated_time: &'static str,
}

pub fn sections() -> Vec<Section> {
  vec![
    Section {
      id: SectionId::Variables,
      title: "Variables Fundamentales",
      description: "Domina enteros, flotantes, cadenas y operaciones básicas",
      icon: "Code2",
      total_exercises: SECTION_SIZE,
      estimated_time: "2-3 horas",
    },
    Section {
      id: SectionId::Colecciones,
      title: "Colecciones de Datos",
      description: "Listas, diccionarios y manipulación de estructuras",
      icon: "Database",
      total_exercises: SECTION_SIZE,
      estimated_time: "3-4 horas",
    },
    Section {
      id: SectionId::Bucles,
      title: "Bucles y Condicionales",
      description: "Control de flujo con for, if, else y while",
      icon: "GitBranch",
      total_exercises: SECTION_SIZE,
      estimated_time: "3-4 horas",
    },
    Section {
      id: SectionId::Funciones,
      title: "Funciones",
      description: "Definición, parámetros, return y scope",
      icon: "FunctionSquare",
      total_exercises: SECTION_SIZE,
      estimated_time: "4-5 horas",
    },
  ]
}

/// All generated sections, held for the process lifetime.
#[derive(Clone, Debug, Default)]
pub struct ExerciseBank {
  by_section: HashMap<SectionId, Vec<Exercise>>,
}

impl ExerciseBank {
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let by_section = SectionId::ALL
      .into_iter()
      .map(|id| (id, generate_section(id, rng)))
      .collect();
    Self { by_section }
  }

  pub fn section(&self, id: SectionId) -> Option<&[Exercise]> {
    self.by_section.get(&id).map(|v| v.as_slice())
  }

  pub fn find(&self, section: SectionId, exercise_id: &str) -> Option<&Exercise> {
    self.section(section)?.iter().find(|e| e.id == exercise_id)
  }

  pub fn len(&self) -> usize {
    self.by_section.values().map(|v| v.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

pub fn generate_section<R: Rng + ?Sized>(section: SectionId, rng: &mut R) -> Vec<Exercise> {
  match section {
    SectionId::Variables => variables(rng),
    SectionId::Colecciones => collections(),
    SectionId::Bucles => loops(),
    SectionId::Funciones => functions(rng),
  }
}

fn hints(items: [String; 3]) -> Vec<String> {
  items.into_iter().collect()
}

fn json_list<T: Serialize>(items: &[T]) -> String {
  serde_json::to_string(items).unwrap_or_default()
}

fn round2(x: f64) -> f64 {
  (x * 100.0).round() / 100.0
}

// ------------------------------------------------------------------
// variables: 70 numeric slots, then 30 string slots
// ------------------------------------------------------------------

struct IntOp {
  symbol: &'static str,
  name: &'static str,
}

const INT_OPS: [IntOp; 5] = [
  IntOp { symbol: "+", name: "suma" },
  IntOp { symbol: "-", name: "resta" },
  IntOp { symbol: "*", name: "multiplicación" },
  IntOp { symbol: "%", name: "módulo" },
  IntOp { symbol: "//", name: "división entera" },
];

/// Python semantics for the operators above (operands are positive).
fn apply_int_op(symbol: &str, a: i64, b: i64) -> i64 {
  match symbol {
    "+" => a + b,
    "-" => a - b,
    "*" => a * b,
    "%" => a.rem_euclid(b),
    _ => a.div_euclid(b),
  }
}

const NUMERIC_SLOTS: usize = 70;
const NAMES: [&str; 8] = ["Ada", "Alan", "Grace", "Tim", "Guido", "Python", "Code", "Data"];

fn variables<R: Rng + ?Sized>(rng: &mut R) -> Vec<Exercise> {
  let mut out = Vec::with_capacity(SECTION_SIZE);

  for i in 0..NUMERIC_SLOTS {
    let difficulty = Difficulty::tier(i, 20, 50);
    if i % 2 == 0 {
      let a: i64 = rng.gen_range(1..=50);
      let b: i64 = rng.gen_range(1..=50);
      let op = &INT_OPS[i % INT_OPS.len()];
      let result = apply_int_op(op.symbol, a, b);
      out.push(Exercise {
        id: format!("var-int-{}", i),
        section_id: SectionId::Variables,
        prompt: format!(
          "Define dos variables 'a' y 'b' con los valores {a} y {b}. Realiza la operación de {} ({}) y guarda el resultado en la variable 'resultado'.",
          op.name, op.symbol
        ),
        starter_code: STARTER_CODE.into(),
        expected_result: ExpectedResult::Integer(result),
        result_type: ResultType::Integer,
        difficulty,
        hints: hints([
          format!("Usa el operador {} para realizar la operación", op.symbol),
          format!("La sintaxis es: resultado = a {} b", op.symbol),
          format!("Primero define a = {a} y b = {b}, luego calcula resultado = a {} b", op.symbol),
        ]),
        explanation: format!(
          "En Python, el operador {} se usa para {}. El resultado de {a} {} {b} es {result}.",
          op.symbol, op.name, op.symbol
        ),
      });
    } else {
      let x = round2(rng.gen_range(1.0..11.0));
      let y = round2(rng.gen_range(0.5..5.5));
      let result = round2(x * y);
      out.push(Exercise {
        id: format!("var-float-{}", i),
        section_id: SectionId::Variables,
        prompt: format!(
          "Define dos variables flotantes 'x' e 'y' con los valores {x} y {y}. Multiplícalas y guarda el resultado redondeado a 2 decimales en 'resultado'."
        ),
        starter_code: STARTER_CODE.into(),
        expected_result: ExpectedResult::Float(result),
        result_type: ResultType::Float,
        difficulty,
        hints: hints([
          "Usa el operador * para multiplicar números flotantes".into(),
          "Puedes usar round(valor, 2) para redondear a 2 decimales".into(),
          format!("Define x = {x} e y = {y}, luego resultado = round(x * y, 2)"),
        ]),
        explanation: format!("Los números flotantes en Python representan valores decimales. {x} * {y} = {result}"),
      });
    }
  }

  for i in NUMERIC_SLOTS..SECTION_SIZE {
    let name = NAMES[i % NAMES.len()];
    let num: u32 = rng.gen_range(10..100);
    if i % 3 == 0 {
      out.push(text_exercise(
        format!("var-str-concat-{}", i),
        SectionId::Variables,
        format!("Define una variable 'nombre' con el valor \"{name}\". Concaténala con el texto \"Hola, \" y guarda el resultado en 'resultado'."),
        STARTER_CODE,
        format!("Hola, {name}"),
        Difficulty::Easy,
        hints([
          "Usa el operador + para concatenar strings".into(),
          "La sintaxis es: resultado = \"Hola, \" + nombre".into(),
          format!("Define nombre = \"{name}\" y luego concatena con \"Hola, \""),
        ]),
        "En Python, puedes concatenar strings usando el operador +.",
      ));
    } else {
      out.push(text_exercise(
        format!("var-str-convert-{}", i),
        SectionId::Variables,
        format!("Convierte el número {num} a una cadena de texto usando la función str() y guárdalo en 'resultado'."),
        STARTER_CODE,
        num.to_string(),
        Difficulty::Easy,
        hints([
          "Usa la función str() para convertir números a strings".into(),
          format!("La sintaxis es: resultado = str({num})"),
          format!("str({num}) devuelve \"{num}\" como string"),
        ]),
        "La función str() convierte cualquier valor a su representación en string.",
      ));
    }
  }

  out
}

#[allow(clippy::too_many_arguments)]
fn text_exercise(
  id: String,
  section_id: SectionId,
  prompt: String,
  starter_code: &str,
  expected: String,
  difficulty: Difficulty,
  hints: Vec<String>,
  explanation: &str,
) -> Exercise {
  typed_exercise(id, section_id, prompt, starter_code, ExpectedResult::Text(expected), difficulty, hints, explanation)
}

#[allow(clippy::too_many_arguments)]
fn typed_exercise(
  id: String,
  section_id: SectionId,
  prompt: String,
  starter_code: &str,
  expected: ExpectedResult,
  difficulty: Difficulty,
  hints: Vec<String>,
  explanation: &str,
) -> Exercise {
  Exercise {
    id,
    section_id,
    prompt,
    starter_code: starter_code.to_string(),
    result_type: expected.result_type(),
    expected_result: expected,
    difficulty,
    hints,
    explanation: explanation.to_string(),
  }
}

// ------------------------------------------------------------------
// colecciones: 50 list slots, then 50 dictionary slots
// ------------------------------------------------------------------

const FRUITS: [&str; 4] = ["manzana", "banana", "cereza", "durazno"];
const LIST_SLOTS: usize = 50;
const PERSON_JSON: &str = r#"{"nombre":"Ana","edad":25,"ciudad":"Madrid"}"#;
const PERSON_WITH_JOB_JSON: &str = r#"{"nombre":"Ana","edad":25,"ciudad":"Madrid","profesion":"Ingeniera"}"#;

fn collections() -> Vec<Exercise> {
  let mut out = Vec::with_capacity(SECTION_SIZE);
  let initial = &FRUITS[..3];
  let initial_json = json_list(initial);

  for i in 0..LIST_SLOTS {
    let tier = Difficulty::tier(i, 15, 35);
    match i % 4 {
      0 => {
        let new_item = FRUITS[3];
        out.push(text_exercise(
          format!("col-list-append-{}", i),
          SectionId::Colecciones,
          format!("Crea una lista llamada 'frutas' con los elementos {initial_json}. Usa el método append() para añadir \"{new_item}\" al final. Guarda la lista completa en 'resultado'."),
          STARTER_CODE,
          json_list(&FRUITS),
          tier,
          hints([
            "El método append() añade un elemento al final de la lista".into(),
            "Sintaxis: lista.append(elemento)".into(),
            format!("Crea frutas = {initial_json}, luego frutas.append(\"{new_item}\")"),
          ]),
          "append() es un método de listas que añade un elemento al final.",
        ));
      }
      1 => {
        let last = initial[initial.len() - 1];
        out.push(text_exercise(
          format!("col-list-pop-{}", i),
          SectionId::Colecciones,
          format!("Crea una lista 'items' con {initial_json}. Usa pop() para eliminar y guardar el último elemento en 'resultado'."),
          STARTER_CODE,
          last.to_string(),
          tier,
          hints([
            "pop() elimina y devuelve el último elemento".into(),
            "Sintaxis: elemento = lista.pop()".into(),
            format!("El último elemento es \"{last}\""),
          ]),
          "pop() elimina y retorna el último elemento de una lista.",
        ));
      }
      2 => {
        let idx = i % initial.len();
        let target = initial[idx];
        out.push(typed_exercise(
          format!("col-list-index-{}", i),
          SectionId::Colecciones,
          format!("Crea una lista 'datos' con {initial_json}. Encuentra el índice de \"{target}\" usando index() y guárdalo en 'resultado'."),
          STARTER_CODE,
          ExpectedResult::Integer(idx as i64),
          tier,
          hints([
            "index() devuelve la posición del elemento".into(),
            "Sintaxis: indice = lista.index(elemento)".into(),
            format!("El índice de \"{target}\" es {idx}"),
          ]),
          "index() retorna la posición (índice) de un elemento en la lista.",
        ));
      }
      _ => {
        out.push(typed_exercise(
          format!("col-list-len-{}", i),
          SectionId::Colecciones,
          format!("Crea una lista 'numeros' con {initial_json}. Usa len() para obtener la cantidad de elementos y guárdala en 'resultado'."),
          STARTER_CODE,
          ExpectedResult::Integer(initial.len() as i64),
          Difficulty::Easy,
          hints([
            "len() devuelve la cantidad de elementos".into(),
            "Sintaxis: cantidad = len(lista)".into(),
            format!("La lista tiene {} elementos", initial.len()),
          ]),
          "len() retorna el número de elementos en una colección.",
        ));
      }
    }
  }

  for i in LIST_SLOTS..SECTION_SIZE {
    let tier = Difficulty::tier(i, 60, 85);
    match i % 3 {
      0 => out.push(text_exercise(
        format!("col-dict-access-{}", i),
        SectionId::Colecciones,
        format!("Crea un diccionario 'persona' con {PERSON_JSON}. Accede al valor de la clave 'nombre' y guárdalo en 'resultado'."),
        STARTER_CODE,
        "Ana".into(),
        tier,
        hints([
          "Accede a valores del diccionario con dict[clave]".into(),
          "Sintaxis: valor = persona[\"nombre\"]".into(),
          "El valor de \"nombre\" es \"Ana\"".into(),
        ]),
        "Accedes a valores en un diccionario usando la notación de corchetes.",
      )),
      1 => out.push(text_exercise(
        format!("col-dict-add-{}", i),
        SectionId::Colecciones,
        format!("Crea un diccionario 'persona' con {PERSON_JSON}. Añade la clave 'profesion' con valor 'Ingeniera'. Guarda el diccionario completo como JSON string en 'resultado' usando str(dict)."),
        STARTER_CODE,
        PERSON_WITH_JOB_JSON.into(),
        tier,
        hints([
          "Añade elementos con dict[nueva_clave] = valor".into(),
          "Convierte el dict a string con str()".into(),
          "persona[\"profesion\"] = \"Ingeniera\"".into(),
        ]),
        "Añades pares clave-valor a un diccionario con la notación de corchetes.",
      )),
      _ => out.push(typed_exercise(
        format!("col-dict-pop-{}", i),
        SectionId::Colecciones,
        format!("Crea un diccionario 'data' con {PERSON_JSON}. Usa pop('edad') para eliminar y guardar el valor de 'edad' en 'resultado'."),
        STARTER_CODE,
        ExpectedResult::Integer(25),
        tier,
        hints([
          "pop(clave) elimina y retorna el valor".into(),
          "Sintaxis: valor = dict.pop(\"edad\")".into(),
          "El valor de edad es 25".into(),
        ]),
        "pop() elimina una clave del diccionario y retorna su valor.",
      )),
    }
  }

  out
}

// ------------------------------------------------------------------
// bucles: four rotating templates over fixed data
// ------------------------------------------------------------------

const LOOP_NUMS: [i64; 8] = [1, 5, 10, 20, 3, 7, 12, 8];
const LOOP_WORDS: [&str; 4] = ["sol", "luna", "estrella", "planeta"];

fn loops() -> Vec<Exercise> {
  let mut out = Vec::with_capacity(SECTION_SIZE);
  let nums_json = json_list(&LOOP_NUMS);
  let words_json = json_list(&LOOP_WORDS);

  for i in 0..SECTION_SIZE {
    let tier = Difficulty::tier(i, 25, 70);
    match i % 4 {
      0 => {
        let even = i % 8 == 0;
        let (label, remainder) = if even { ("pares", 0) } else { ("impares", 1) };
        let sum: i64 = LOOP_NUMS.iter().filter(|n| *n % 2 == remainder).sum();
        out.push(typed_exercise(
          format!("loop-sum-{}", i),
          SectionId::Bucles,
          format!("Dada la lista numeros = {nums_json}, usa un bucle for y una condición if para sumar solo los números {label}. Guarda la suma en 'resultado'."),
          &format!("numeros = {nums_json}\n# Tu código aquí\n"),
          ExpectedResult::Integer(sum),
          tier,
          hints([
            "Usa for num in numeros: para iterar".into(),
            format!("Usa if num % 2 == {remainder}: para filtrar"),
            "Inicializa resultado = 0 y suma con resultado += num".into(),
          ]),
          &format!("Los bucles for iteran sobre listas. El módulo (%) detecta los {label}."),
        ));
      }
      1 => {
        let long = LOOP_WORDS.iter().filter(|w| w.chars().count() >= 5).count();
        out.push(typed_exercise(
          format!("loop-count-{}", i),
          SectionId::Bucles,
          format!("Dada la lista palabras = {words_json}, cuenta cuántas palabras tienen 5 o más letras. Guarda el conteo en 'resultado'."),
          &format!("palabras = {words_json}\n# Tu código aquí\n"),
          ExpectedResult::Integer(long as i64),
          tier,
          hints([
            "Usa for palabra in palabras:".into(),
            "Usa if len(palabra) >= 5:".into(),
            "Incrementa un contador con resultado += 1".into(),
          ]),
          "len() devuelve la longitud de un string. Combínalo con if para contar.",
        ));
      }
      2 => {
        let values = &LOOP_NUMS[..4];
        let doubled: Vec<i64> = values.iter().map(|n| n * 2).collect();
        let values_json = json_list(values);
        out.push(text_exercise(
          format!("loop-build-{}", i),
          SectionId::Bucles,
          format!("Dada la lista valores = {values_json}, crea una nueva lista que contenga cada número multiplicado por 2. Guarda la nueva lista en 'resultado'. Usa str(resultado) para convertirla a string."),
          &format!("valores = {values_json}\n# Tu código aquí\n"),
          json_list(&doubled),
          tier,
          hints([
            "Crea una lista vacía: resultado = []".into(),
            "Usa for val in valores:".into(),
            "Añade el doble con resultado.append(val * 2)".into(),
          ]),
          "Puedes construir nuevas listas iterando y usando append().",
        ));
      }
      _ => {
        let data = &LOOP_NUMS[..5];
        let max = data.iter().copied().max().unwrap_or_default();
        let data_json = json_list(data);
        out.push(typed_exercise(
          format!("loop-max-{}", i),
          SectionId::Bucles,
          format!("Dada la lista datos = {data_json}, encuentra el número más grande usando un bucle. Guarda el máximo en 'resultado'."),
          &format!("datos = {data_json}\n# Tu código aquí\n"),
          ExpectedResult::Integer(max),
          tier,
          hints([
            "Inicializa resultado = datos[0]".into(),
            "Usa for num in datos:".into(),
            "Actualiza resultado si num > resultado".into(),
          ]),
          "Compara cada elemento con el máximo actual para encontrar el mayor.",
        ));
      }
    }
  }

  out
}

// ------------------------------------------------------------------
// funciones
// ------------------------------------------------------------------

const GREET_NAMES: [&str; 4] = ["Ana", "Luis", "María", "Carlos"];

fn functions<R: Rng + ?Sized>(rng: &mut R) -> Vec<Exercise> {
  let mut out = Vec::with_capacity(SECTION_SIZE);

  for i in 0..SECTION_SIZE {
    let tier = Difficulty::tier(i, 25, 70);
    match i % 4 {
      0 => {
        let a: i64 = rng.gen_range(1..=20);
        let b: i64 = rng.gen_range(1..=20);
        out.push(typed_exercise(
          format!("func-simple-{}", i),
          SectionId::Funciones,
          format!("Define una función llamada 'sumar' que reciba dos parámetros (a, b) y retorne su suma. Luego llama a la función con {a} y {b}, y guarda el resultado en 'resultado'."),
          FUNCTION_STARTER_CODE,
          ExpectedResult::Integer(a + b),
          tier,
          hints([
            "Usa def sumar(a, b): para definir la función".into(),
            "Retorna el valor con return a + b".into(),
            format!("Llama con resultado = sumar({a}, {b})"),
          ]),
          "Las funciones encapsulan código reutilizable y usan return para devolver valores.",
        ));
      }
      1 => {
        let name = GREET_NAMES[i % GREET_NAMES.len()];
        out.push(text_exercise(
          format!("func-string-{}", i),
          SectionId::Funciones,
          format!("Define una función 'saludar' que reciba un parámetro 'nombre' y retorne \"Hola, \" + nombre + \"!\". Llámala con \"{name}\" y guarda el resultado en 'resultado'."),
          FUNCTION_STARTER_CODE,
          format!("Hola, {name}!"),
          tier,
          hints([
            "def saludar(nombre):".into(),
            "return \"Hola, \" + nombre + \"!\"".into(),
            format!("resultado = saludar(\"{name}\")"),
          ]),
          "Las funciones pueden trabajar con strings y concatenarlos.",
        ));
      }
      2 => {
        let nums = [2, 4, 6, 8];
        let doubled: Vec<i64> = nums.iter().map(|n| n * 2).collect();
        out.push(text_exercise(
          format!("func-list-{}", i),
          SectionId::Funciones,
          format!("Define una función 'duplicar_lista' que reciba una lista y retorne una nueva lista con cada elemento multiplicado por 2. Llámala con {} y guarda el resultado como string con str() en 'resultado'.", json_list(&nums)),
          FUNCTION_STARTER_CODE,
          json_list(&doubled),
          tier,
          hints([
            "def duplicar_lista(lista):".into(),
            "Crea una nueva lista y usa un bucle".into(),
            "Retorna la nueva lista".into(),
          ]),
          "Las funciones pueden procesar listas y retornar nuevas listas.",
        ));
      }
      _ => {
        let num: i64 = rng.gen_range(1..=100);
        out.push(typed_exercise(
          format!("func-cond-{}", i),
          SectionId::Funciones,
          format!("Define una función 'es_par' que reciba un número y retorne True si es par, False si es impar. Llámala con {num} y guarda el resultado en 'resultado'."),
          FUNCTION_STARTER_CODE,
          ExpectedResult::Boolean(num % 2 == 0),
          tier,
          hints([
            "def es_par(num):".into(),
            "Usa if num % 2 == 0: return True".into(),
            "else: return False".into(),
          ]),
          "Las funciones pueden usar condicionales para tomar decisiones.",
        ));
      }
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn bank(seed: u64) -> ExerciseBank {
    ExerciseBank::generate(&mut StdRng::seed_from_u64(seed))
  }

  fn tiers(ex: &[Exercise]) -> (usize, usize, usize) {
    let count = |d| ex.iter().filter(|e| e.difficulty == d).count();
    (count(Difficulty::Easy), count(Difficulty::Medium), count(Difficulty::Hard))
  }

  #[test]
  fn every_section_has_a_full_bank_with_unique_ids() {
    let b = bank(7);
    assert_eq!(b.len(), 4 * SECTION_SIZE);
    for id in SectionId::ALL {
      let ex = b.section(id).unwrap();
      assert_eq!(ex.len(), SECTION_SIZE);
      let mut ids: Vec<&str> = ex.iter().map(|e| e.id.as_str()).collect();
      ids.sort();
      ids.dedup();
      assert_eq!(ids.len(), SECTION_SIZE);
      assert!(ex.iter().all(|e| e.section_id == id && e.hints.len() == 3));
      assert!(ex.iter().all(|e| e.result_type == e.expected_result.result_type()));
    }
  }

  #[test]
  fn variables_numeric_then_strings() {
    let b = bank(1);
    let ex = b.section(SectionId::Variables).unwrap();
    assert!(ex[..70]
      .iter()
      .all(|e| matches!(e.result_type, ResultType::Integer | ResultType::Float)));
    assert!(ex[70..].iter().all(|e| e.result_type == ResultType::String));
    assert_eq!(ex[0].id, "var-int-0");
    assert_eq!(ex[1].id, "var-float-1");
    assert_eq!(ex[72].id, "var-str-concat-72");
    assert_eq!(ex[71].id, "var-str-convert-71");
  }

  #[test]
  fn variables_difficulty_boundaries() {
    let b = bank(2);
    let ex = b.section(SectionId::Variables).unwrap();
    assert_eq!(tiers(&ex[..70]), (20, 30, 20));
    assert_eq!(tiers(&ex[70..]), (30, 0, 0));
    assert_eq!(ex[19].difficulty, Difficulty::Easy);
    assert_eq!(ex[20].difficulty, Difficulty::Medium);
    assert_eq!(ex[50].difficulty, Difficulty::Hard);
  }

  #[test]
  fn other_section_tier_distributions() {
    let b = bank(3);
    // lists: 15/20/15, except the 12 len slots (i % 4 == 3) which are always easy
    let col = b.section(SectionId::Colecciones).unwrap();
    assert_eq!(tiers(&col[..50]), (15 + 5 + 4, 20 - 5, 15 - 4));
    assert_eq!(tiers(&col[50..]), (10, 25, 15));
    assert_eq!(tiers(b.section(SectionId::Bucles).unwrap()), (25, 45, 30));
    assert_eq!(tiers(b.section(SectionId::Funciones).unwrap()), (25, 45, 30));
  }

  #[test]
  fn operand_values_stay_in_range_and_results_are_consistent() {
    let b = bank(11);
    for e in &b.section(SectionId::Variables).unwrap()[..70] {
      if let ExpectedResult::Float(x) = e.expected_result {
        assert_eq!(round2(x), x);
      }
    }
    for e in b.section(SectionId::Funciones).unwrap() {
      if e.id.starts_with("func-simple") {
        let ExpectedResult::Integer(sum) = e.expected_result else { panic!("int expected") };
        assert!((2..=40).contains(&sum));
      }
    }
  }

  #[test]
  fn fixed_templates_have_known_answers() {
    let b = bank(5);
    let loops = b.section(SectionId::Bucles).unwrap();
    assert_eq!(loops[0].expected_result, ExpectedResult::Integer(10 + 20 + 12 + 8));
    assert_eq!(loops[4].expected_result, ExpectedResult::Integer(1 + 5 + 3 + 7));
    assert_eq!(loops[1].expected_result, ExpectedResult::Integer(2));
    assert_eq!(loops[2].expected_result, ExpectedResult::Text("[2,10,20,40]".into()));
    assert_eq!(loops[3].expected_result, ExpectedResult::Integer(20));

    let col = b.section(SectionId::Colecciones).unwrap();
    assert_eq!(
      col[0].expected_result,
      ExpectedResult::Text(r#"["manzana","banana","cereza","durazno"]"#.into())
    );
    assert_eq!(col[2].expected_result, ExpectedResult::Integer(2));
    assert_eq!(col[51].expected_result, ExpectedResult::Text("Ana".into()));
  }

  #[test]
  fn seeded_generation_is_reproducible() {
    let a = bank(42);
    let b = bank(42);
    for id in SectionId::ALL {
      let left: Vec<_> = a.section(id).unwrap().iter().map(|e| e.expected_result.clone()).collect();
      let right: Vec<_> = b.section(id).unwrap().iter().map(|e| e.expected_result.clone()).collect();
      assert_eq!(left, right);
    }
  }

  #[test]
  fn find_looks_inside_the_given_section_only() {
    let b = bank(9);
    assert!(b.find(SectionId::Variables, "var-int-0").is_some());
    assert!(b.find(SectionId::Bucles, "var-int-0").is_none());
  }

  #[test]
  fn python_integer_ops() {
    assert_eq!(apply_int_op("//", 7, 2), 3);
    assert_eq!(apply_int_op("%", 7, 3), 1);
    assert_eq!(apply_int_op("-", 3, 7), -4);
  }
}
